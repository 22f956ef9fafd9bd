use console_core::{update, Effect, Msg, SessionState};

#[test]
fn update_is_noop() {
    let state = SessionState::new(Default::default());
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn preferences_changes_emit_save_effect() {
    let state = SessionState::default();
    let (state, effects) = update(state, Msg::DownloadDirEdited("  /data/gs  ".into()));
    assert_eq!(
        effects,
        vec![Effect::SavePreferences {
            download_dir: "/data/gs".into(),
            companies: String::new(),
        }]
    );

    let (state, effects) = update(state, Msg::DownloadDirEdited("/data/gs".into()));
    assert!(effects.is_empty());
    let (_state, effects) = update(state, Msg::DownloadDirEdited("   ".into()));
    assert!(effects.is_empty());
}

#[test]
fn restore_preferences_is_silent() {
    let (state, effects) = update(
        SessionState::default(),
        Msg::RestorePreferences {
            download_dir: Some("saved".into()),
            companies: Some("Apple, Tesla".into()),
        },
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.download_dir, "saved");
    assert_eq!(view.companies_input, "Apple, Tesla");
}
