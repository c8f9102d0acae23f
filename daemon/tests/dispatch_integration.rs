mod common;

use common::{dispatcher, final_batch, Calls, ScriptedEngine};
use shared::{ResultBatch, TranscriptResult};
use voixd::{
    CommandPattern, DispatchEvent, Dispatcher, EngineConfig, Extractor, KeyCode, ListenControl,
    SessionError, SessionState, TriggerBinding, TriggerOutcome,
};

#[test]
fn test_mixed_case_padded_utterance_dispatches_once_without_argument() {
    let calls = Calls::default();
    let mut dispatcher = dispatcher();
    dispatcher.register(CommandPattern::exact("open tab"), calls.handler("h"));
    dispatcher.start();

    dispatcher.handle_batch(&final_batch(&["  Open Tab  "]));

    assert_eq!(calls.all(), vec![("h".to_string(), None)]);
}

#[test]
fn test_fan_out_in_registration_order() {
    let calls = Calls::default();
    let mut dispatcher = dispatcher();
    dispatcher.register(CommandPattern::exact("open tab"), calls.handler("first"));
    dispatcher.register(CommandPattern::exact("open tab"), calls.handler("second"));
    dispatcher.start();

    let report = dispatcher.handle_batch(&final_batch(&["open tab"]));

    assert_eq!(calls.names(), vec!["first", "second"]);
    assert_eq!(
        report.events,
        vec![DispatchEvent::Dispatched {
            key: "open tab".to_string(),
            argument: None,
            listeners: 2,
        }]
    );
}

#[test]
fn test_interim_result_never_dispatches() {
    let calls = Calls::default();
    let mut dispatcher = dispatcher();
    dispatcher.register(CommandPattern::exact("open tab"), calls.handler("h"));
    dispatcher.start();

    let report = dispatcher.handle_batch(&ResultBatch::new(
        0,
        vec![TranscriptResult::interim_text("open tab")],
    ));

    assert!(report.accepted);
    assert!(report.events.is_empty());
    assert_eq!(calls.len(), 0);
}

#[test]
fn test_unregistered_command_is_unmatched_not_a_crash() {
    let calls = Calls::default();
    let mut dispatcher = dispatcher();
    dispatcher.register(CommandPattern::exact("open tab"), calls.handler("h"));
    dispatcher.register(CommandPattern::exact("google"), calls.handler("google"));
    assert!(dispatcher.unregister("open tab"));
    dispatcher.start();

    let report = dispatcher.handle_batch(&final_batch(&["open tab", "google"]));

    assert_eq!(report.unmatched(), vec!["open tab"]);
    assert_eq!(report.dispatched(), vec!["google"]);
    assert_eq!(calls.names(), vec!["google"]);
}

#[test]
fn test_prefix_command_receives_remainder() {
    let calls = Calls::default();
    let mut dispatcher = dispatcher();
    dispatcher.register(CommandPattern::prefix("search"), calls.handler("search"));

    dispatcher.start();
    dispatcher.handle_batch(&final_batch(&["search cats"]));
    dispatcher.start();
    dispatcher.handle_batch(&final_batch(&["search"]));

    assert_eq!(
        calls.all(),
        vec![
            ("search".to_string(), Some("cats".to_string())),
            ("search".to_string(), Some(String::new())),
        ]
    );
}

#[test]
fn test_double_start_attaches_one_handler() {
    let calls = Calls::default();
    let mut dispatcher = dispatcher();
    dispatcher.register(CommandPattern::exact("open tab"), calls.handler("h"));

    dispatcher.start();
    dispatcher.start();
    dispatcher.handle_batch(&final_batch(&["open tab"]));
    let second = dispatcher.handle_batch(&final_batch(&["open tab"]));

    assert_eq!(calls.len(), 1);
    assert!(!second.accepted);
}

#[test]
fn test_results_dispatch_in_index_order() {
    let calls = Calls::default();
    let mut dispatcher = dispatcher();
    dispatcher.register(CommandPattern::exact("close tab"), calls.handler("three"));
    dispatcher.register(CommandPattern::exact("open tab"), calls.handler("four"));
    dispatcher.start();

    let batch = ResultBatch::new(
        2,
        vec![
            TranscriptResult::final_text("open tab"),
            TranscriptResult::final_text("open tab"),
            TranscriptResult::interim_text("close"),
            TranscriptResult::final_text("close tab"),
            TranscriptResult::final_text("open tab"),
        ],
    );
    dispatcher.handle_batch(&batch);

    assert_eq!(calls.names(), vec!["three", "four"]);
}

#[test]
fn test_holding_trigger_starts_once() {
    struct CountingStarts<'a> {
        inner: &'a mut Dispatcher<ScriptedEngine>,
        starts: usize,
    }

    impl ListenControl for CountingStarts<'_> {
        fn start(&mut self) {
            self.starts += 1;
            self.inner.start();
        }

        fn stop(&mut self) {
            self.inner.stop();
        }

        fn is_listening(&self) -> bool {
            self.inner.is_listening()
        }
    }

    let mut dispatcher = dispatcher();
    let mut control = CountingStarts {
        inner: &mut dispatcher,
        starts: 0,
    };
    let mut trigger = TriggerBinding::new(KeyCode::V);

    let outcomes: Vec<TriggerOutcome> = (0..5)
        .map(|_| trigger.key_down(KeyCode::V, &mut control))
        .collect();

    assert_eq!(control.starts, 1);
    assert_eq!(outcomes[0], TriggerOutcome::Armed);
    assert!(outcomes[1..].iter().all(|o| *o == TriggerOutcome::Repeat));
    assert_eq!(dispatcher.state(), SessionState::Listening);
}

#[test]
fn test_trigger_cycle_with_batches() {
    let calls = Calls::default();
    let mut dispatcher = dispatcher();
    dispatcher.register(CommandPattern::exact("open window"), calls.handler("window"));
    let mut trigger = TriggerBinding::default();

    trigger.key_down(KeyCode::V, &mut dispatcher);
    dispatcher.handle_batch(&final_batch(&["open window"]));
    assert_eq!(dispatcher.state(), SessionState::Stopped);

    // Still held: the trigger does not re-arm until released.
    trigger.key_down(KeyCode::V, &mut dispatcher);
    assert_eq!(dispatcher.state(), SessionState::Stopped);

    trigger.key_up(KeyCode::V);
    trigger.key_down(KeyCode::V, &mut dispatcher);
    dispatcher.handle_batch(&final_batch(&["open window"]));

    assert_eq!(calls.len(), 2);
}

#[test]
fn test_batch_after_stop_is_dropped() {
    let calls = Calls::default();
    let mut dispatcher = dispatcher();
    dispatcher.register(CommandPattern::exact("open tab"), calls.handler("h"));
    dispatcher.start();
    dispatcher.stop();

    let report = dispatcher.handle_batch(&final_batch(&["open tab"]));

    assert!(!report.accepted);
    assert_eq!(calls.len(), 0);
}

#[test]
fn test_failing_handler_does_not_abort_batch() {
    let calls = Calls::default();
    let mut dispatcher = dispatcher();
    dispatcher.register(
        CommandPattern::exact("delete history"),
        Box::new(|_| -> anyhow::Result<()> { anyhow::bail!("history service unavailable") }),
    );
    dispatcher.register(CommandPattern::exact("open history"), calls.handler("history"));
    dispatcher.start();

    let report = dispatcher.handle_batch(&final_batch(&["delete history", "open history"]));

    assert_eq!(
        report.failures(),
        vec![("delete history", "history service unavailable")]
    );
    assert_eq!(calls.names(), vec!["history"]);
    assert_eq!(dispatcher.state(), SessionState::Stopped);
}

#[test]
fn test_overlapping_commands_resolve_deterministically() {
    let calls = Calls::default();
    let mut dispatcher = dispatcher();
    dispatcher.register(CommandPattern::prefix("open website"), calls.handler("website"));
    dispatcher.register(CommandPattern::exact("open tab"), calls.handler("tab"));
    dispatcher.register(
        CommandPattern::exact("open tab in new window"),
        calls.handler("tab-window"),
    );
    dispatcher.register(
        CommandPattern::prefix_with("directions from", Extractor::After(" to ".to_string())),
        calls.handler("directions"),
    );
    dispatcher.start();

    dispatcher.handle_batch(&final_batch(&[
        "open tab in new window",
        "open tab",
        "open website in new tab example.com",
        "directions from london to paris",
    ]));

    assert_eq!(
        calls.all(),
        vec![
            ("tab-window".to_string(), None),
            ("tab".to_string(), None),
            (
                "website".to_string(),
                Some("in new tab example.com".to_string())
            ),
            ("directions".to_string(), Some("paris".to_string())),
        ]
    );
}

#[test]
fn test_two_part_commands_reach_both_parts() {
    let calls = Calls::default();
    let mut dispatcher = dispatcher();
    for phrase in ["directions from", "translate"] {
        dispatcher.register(
            CommandPattern::prefix_with(phrase, Extractor::Split(" to ".to_string())),
            calls.handler(phrase),
        );
    }
    dispatcher.start();

    dispatcher.handle_batch(&final_batch(&[
        "directions from home to work",
        "translate good morning to german",
    ]));

    let split = Extractor::Split(" to ".to_string());
    let parts: Vec<Vec<String>> = calls
        .all()
        .into_iter()
        .map(|(_, argument)| split.parts(&argument.unwrap_or_default()))
        .collect();
    assert_eq!(calls.names(), vec!["directions from", "translate"]);
    assert_eq!(
        parts,
        vec![vec!["home", "work"], vec!["good morning", "german"]]
    );
}

#[test]
fn test_engine_start_failure_surfaces_to_owner() {
    let result = Dispatcher::new(ScriptedEngine::failing("no audio device"), EngineConfig::default());
    match result {
        Err(SessionError::EngineStart(e)) => assert!(e.to_string().contains("no audio device")),
        Ok(_) => panic!("engine failure should abort construction"),
    }
}

#[test]
fn test_engine_receives_fixed_policy() {
    let dispatcher = Dispatcher::new(ScriptedEngine::default(), EngineConfig::new("es-ES")).unwrap();
    let config = dispatcher.session().engine().opened_with.clone().unwrap();

    assert_eq!(config.language, "es-ES");
    assert!(config.continuous);
    assert!(!config.interim_results);
    assert_eq!(config.max_alternatives, 1);
}
