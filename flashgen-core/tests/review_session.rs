use flashgen_core::{
    ApiErrorBody, ClientError, Completion, Flashcard, FlashcardProposal, GenerationCreateResponse,
    ReviewSession, SessionError, DEFAULT_USER_ID, NETWORK_ERROR_MESSAGE,
};

fn valid_text() -> String {
    "Enzymes lower activation energy for biochemical reactions. ".repeat(20)
}

fn response(id: i64, fronts: &[&str]) -> GenerationCreateResponse {
    GenerationCreateResponse {
        generation_id: id,
        flashcards_proposals: fronts
            .iter()
            .map(|f| FlashcardProposal::generated(*f, "answer"))
            .collect(),
        generated_count: fronts.len(),
    }
}

fn saved(n: usize) -> Vec<Flashcard> {
    let cmd = flashgen_core::FlashcardRecord {
        front: "q".into(),
        back: "a".into(),
        source: flashgen_core::FlashcardSource::AiFull,
        generation_id: Some(1),
    };
    (0..n)
        .map(|i| Flashcard::from_record(i as i64, DEFAULT_USER_ID, &cmd))
        .collect()
}

fn generated_session() -> ReviewSession {
    let mut s = ReviewSession::with_source_text(valid_text());
    let t = s.begin_generation().unwrap();
    assert_eq!(s.complete_generation(&t, Ok(response(7, &["a", "b", "c"]))), Completion::Applied);
    s
}

#[test]
fn short_text_is_rejected_with_current_length() {
    let mut s = ReviewSession::with_source_text("x".repeat(999));
    assert!(!s.can_generate());
    let err = s.begin_generation().unwrap_err();
    assert_eq!(
        err,
        SessionError::Rejected("Text must contain at least 1000 characters. Current length: 999".into())
    );
    assert_eq!(s.error(), Some("Text must contain at least 1000 characters. Current length: 999"));
    assert!(!s.is_generating());
}

#[test]
fn generation_fills_the_store_with_accepted_entries() {
    let s = generated_session();
    assert_eq!(s.generation_id(), Some(7));
    assert_eq!(s.total_count(), 3);
    assert_eq!(s.accepted_count(), 3);
    assert!(s.save_approved_enabled());
    assert!(s.save_all_enabled());
}

#[test]
fn second_generation_while_in_flight_is_refused() {
    let mut s = ReviewSession::with_source_text(valid_text());
    let _t = s.begin_generation().unwrap();
    assert!(!s.can_generate());
    assert_eq!(s.begin_generation().unwrap_err(), SessionError::GenerationInFlight);
}

#[test]
fn late_generation_result_after_reset_is_ignored() {
    let mut s = ReviewSession::with_source_text(valid_text());
    let t = s.begin_generation().unwrap();
    s.reset();
    assert_eq!(s.complete_generation(&t, Ok(response(1, &["late"]))), Completion::Stale);
    assert_eq!(s.total_count(), 0);
    assert_eq!(s.generation_id(), None);
}

#[test]
fn out_of_order_completion_only_applies_the_latest() {
    let mut s = ReviewSession::with_source_text(valid_text());
    let first = s.begin_generation().unwrap();
    s.reset();
    let second = s.begin_generation().unwrap();

    assert_eq!(s.complete_generation(&second, Ok(response(2, &["new"]))), Completion::Applied);
    assert_eq!(s.complete_generation(&first, Ok(response(1, &["old", "old"]))), Completion::Stale);
    assert_eq!(s.generation_id(), Some(2));
    assert_eq!(s.proposals().get(0).unwrap().proposal.front, "new");
}

#[test]
fn generation_network_failure_shows_connection_hint() {
    let mut s = ReviewSession::with_source_text(valid_text());
    let t = s.begin_generation().unwrap();
    s.complete_generation(&t, Err(ClientError::Network("refused".into())));
    assert_eq!(s.error(), Some(NETWORK_ERROR_MESSAGE));
    assert!(!s.is_generating());
}

#[test]
fn save_is_gated_while_in_flight() {
    let mut s = generated_session();
    let t = s.begin_save(true).unwrap();
    assert_eq!(t.command.flashcards.len(), 3);
    assert!(!s.save_approved_enabled());
    assert!(!s.save_all_enabled());
    assert_eq!(s.begin_save(false).unwrap_err(), SessionError::SaveInFlight);

    assert_eq!(s.complete_save(&t, Ok(saved(3))), Completion::Applied);
    assert!(s.save_success());
    assert!(s.save_all_enabled());
}

#[test]
fn approved_button_disabled_when_nothing_accepted() {
    let mut s = generated_session();
    for i in 0..3 {
        s.toggle_accept(i);
    }
    assert!(!s.save_approved_enabled());
    assert!(s.save_all_enabled());
    let err = s.begin_save(true).unwrap_err();
    assert_eq!(err, SessionError::Rejected("No flashcards selected for saving.".into()));
    assert_eq!(s.save_error(), Some("No flashcards selected for saving."));
    assert!(!s.is_saving());
}

#[test]
fn save_without_generation_is_rejected() {
    let mut s = ReviewSession::with_source_text(valid_text());
    let err = s.begin_save(false).unwrap_err();
    assert_eq!(err, SessionError::Rejected("Missing generation ID. Please try again.".into()));
}

#[test]
fn overlong_edit_blocks_save_until_fixed() {
    let mut s = generated_session();
    s.edit(0, "y".repeat(800), "answer");
    assert_eq!(s.proposals().invalid_indices(), vec![0]);

    let err = s.begin_save(false).unwrap_err();
    assert!(matches!(err, SessionError::Rejected(ref m) if m.contains("Front cannot exceed 200 characters")));

    s.edit(0, "short again", "answer");
    assert!(s.begin_save(false).is_ok());
}

#[test]
fn new_generation_makes_pending_save_stale() {
    let mut s = generated_session();
    let save = s.begin_save(false).unwrap();
    let gen = s.begin_generation().unwrap();
    assert!(!s.is_saving());

    assert_eq!(s.complete_save(&save, Ok(saved(3))), Completion::Stale);
    assert!(!s.save_success());
    assert_eq!(s.complete_generation(&gen, Ok(response(8, &["x"]))), Completion::Applied);
}

#[test]
fn failed_save_keeps_proposals_for_retry() {
    let mut s = generated_session();
    let t = s.begin_save(false).unwrap();
    let err = ClientError::Api {
        status: 500,
        body: ApiErrorBody {
            error: Some("Failed to save flashcards".into()),
            message: Some("db down".into()),
            details: None,
        },
    };
    s.complete_save(&t, Err(err));
    assert_eq!(s.save_error(), Some("Failed to save flashcards"));
    assert_eq!(s.total_count(), 3);
    assert!(s.begin_save(false).is_ok());
}
