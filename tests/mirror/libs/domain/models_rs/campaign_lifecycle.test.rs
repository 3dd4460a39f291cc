/**
 * CERTIFICACIÓN: Autómata de campaña — monotonía estricta con la única
 * excepción del par pause/resume y clausura de estados terminales.
 */
use dominion_domain_models::campaign::{Campaign, CampaignState};

#[test]
fn certify_legal_transitions() {
    use CampaignState::*;

    assert!(Draft.is_transition_allowed(Running));
    assert!(Running.is_transition_allowed(Paused));
    assert!(Paused.is_transition_allowed(Running));
    assert!(Running.is_transition_allowed(Completed));
    assert!(Running.is_transition_allowed(Failed));
    assert!(Paused.is_transition_allowed(Failed));
}

#[test]
fn certify_terminal_states_admit_no_successor() {
    use CampaignState::*;

    for successor in [Draft, Running, Paused, Completed, Failed] {
        assert!(!Completed.is_transition_allowed(successor));
        assert!(!Failed.is_transition_allowed(successor));
    }
}

#[test]
fn certify_monotonicity_violations_are_rejected() {
    use CampaignState::*;

    assert!(!Running.is_transition_allowed(Draft));
    assert!(!Paused.is_transition_allowed(Draft));
    assert!(!Draft.is_transition_allowed(Completed));
    assert!(!Draft.is_transition_allowed(Paused));
    assert!(!Completed.is_transition_allowed(Running), "terminal seal is final");
}

#[test]
fn certify_draft_forge_and_label_roundtrip() {
    let campaign = Campaign::new_draft("prospect-sweep");
    assert_eq!(campaign.state, CampaignState::Draft);
    assert!(campaign.completed_at.is_none());

    for state in [
        CampaignState::Draft,
        CampaignState::Running,
        CampaignState::Paused,
        CampaignState::Completed,
        CampaignState::Failed,
    ] {
        assert_eq!(CampaignState::parse(state.as_str()), Some(state));
    }
    assert_eq!(CampaignState::parse("limbo"), None);
}
