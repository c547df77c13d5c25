use super::types::{AppliedLifeEvent, EventTrigger, LifeEvent, MAX_MONEY, round_money};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LifeEventOutcome {
    pub applied: Vec<AppliedLifeEvent>,
    /// What actually left the pot, after clamping. Negative when money entered it.
    pub pot_cost: i64,
}

fn fires_in(event: &LifeEvent, age: Option<u32>, year: i32) -> bool {
    match event.resolve_trigger(age.is_some()) {
        Some(EventTrigger::Age(trigger_age)) => age == Some(trigger_age),
        Some(EventTrigger::Year(trigger_year)) => trigger_year == year,
        None => false,
    }
}

/// Applies every event scheduled for this age/year to `pot`.
///
/// Costs are netted first. A net outflow drains the pot to zero at most; a net
/// inflow is added in full, up to `MAX_MONEY`. Events that never match a simulated year are simply
/// never applied.
pub fn apply_life_events(
    events: &[LifeEvent],
    age: Option<u32>,
    year: i32,
    pot: &mut i64,
) -> LifeEventOutcome {
    let mut applied = Vec::new();
    let mut net_cost = 0_i64;

    for event in events.iter().filter(|e| fires_in(e, age, year)) {
        let cost = round_money(event.pot_cost());
        net_cost = net_cost.saturating_add(cost);
        applied.push(AppliedLifeEvent {
            name: event.name.clone(),
            category: event.category,
            cost,
        });
    }

    if applied.is_empty() {
        return LifeEventOutcome::default();
    }

    let before = *pot;
    *pot = before.saturating_sub(net_cost).clamp(0, MAX_MONEY);

    LifeEventOutcome {
        applied,
        pot_cost: before - *pot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::LifeEventCategory;

    fn at_age(name: &str, category: LifeEventCategory, age: u32, amount: f64) -> LifeEvent {
        LifeEvent::new(name, category, EventTrigger::Age(age), amount)
    }

    #[test]
    fn matching_events_are_netted_and_reported_in_order() {
        let events = vec![
            at_age("Kitchen", LifeEventCategory::Expense, 66, 12_000.0),
            at_age("Car", LifeEventCategory::Expense, 67, 20_000.0),
            at_age("Inheritance", LifeEventCategory::Income, 66, 5_000.0),
        ];
        let mut pot = 100_000;

        let outcome = apply_life_events(&events, Some(66), 2040, &mut pot);

        assert_eq!(pot, 93_000);
        assert_eq!(outcome.pot_cost, 7_000);
        let names: Vec<_> = outcome.applied.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Kitchen", "Inheritance"]);
        assert_eq!(outcome.applied[1].cost, -5_000);
    }

    #[test]
    fn expense_larger_than_pot_clamps_at_zero() {
        let events = vec![at_age("Roof", LifeEventCategory::Expense, 70, 50_000.0)];
        let mut pot = 30_000;

        let outcome = apply_life_events(&events, Some(70), 2045, &mut pot);

        assert_eq!(pot, 0);
        assert_eq!(outcome.pot_cost, 30_000);
        assert_eq!(outcome.applied[0].cost, 50_000);
    }

    #[test]
    fn windfall_is_added_even_to_an_empty_pot() {
        let events = vec![at_age("Gift", LifeEventCategory::Income, 80, 20_000.0)];
        let mut pot = 0;

        let outcome = apply_life_events(&events, Some(80), 2050, &mut pot);

        assert_eq!(pot, 20_000);
        assert_eq!(outcome.pot_cost, -20_000);
    }

    #[test]
    fn inflow_stops_at_money_ceiling() {
        let events = vec![
            at_age("Windfall", LifeEventCategory::Income, 75, 1e30),
            at_age("Another", LifeEventCategory::Income, 75, 1e30),
        ];
        let mut pot = MAX_MONEY - 10;

        let outcome = apply_life_events(&events, Some(75), 2060, &mut pot);

        assert_eq!(pot, MAX_MONEY);
        assert_eq!(outcome.pot_cost, -10);
        assert_eq!(outcome.applied[0].cost, -MAX_MONEY);
    }

    #[test]
    fn year_trigger_matches_when_age_is_unknown() {
        let mut event = at_age("Holiday", LifeEventCategory::Expense, 60, 4_000.0);
        event.trigger_year = Some(2030);
        let events = vec![event];
        let mut pot = 10_000;

        let unknown_age = apply_life_events(&events, None, 2030, &mut pot);
        assert_eq!(unknown_age.pot_cost, 4_000);

        let known_age_wrong_age = apply_life_events(&events, Some(59), 2030, &mut pot);
        assert!(known_age_wrong_age.applied.is_empty());
        assert_eq!(pot, 6_000);
    }

    #[test]
    fn unresolvable_event_is_skipped() {
        let mut event = at_age("Someday", LifeEventCategory::Expense, 60, 1_000.0);
        event.trigger_age = None;
        let mut pot = 10_000;

        let outcome = apply_life_events(&[event], Some(60), 2030, &mut pot);

        assert_eq!(outcome, LifeEventOutcome::default());
        assert_eq!(pot, 10_000);
    }
}
