//! End-to-end tests of the conversation flow through the event channel.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use parrot_core::config::ChatConfig;
use parrot_core::session::{MessageRole, NoticeKind, SessionEvent};
use parrot_interaction::ConversationController;

const REPLY_DELAY: Duration = Duration::from_millis(50);
const EVENT_WAIT: Duration = Duration::from_millis(500);

fn controller_with_channel() -> (ConversationController, mpsc::Receiver<SessionEvent>) {
    let (tx, rx) = mpsc::channel(64);
    let controller =
        ConversationController::new(tx, &ChatConfig::default()).with_reply_delay(REPLY_DELAY);
    (controller, rx)
}

async fn next_event(rx: &mut mpsc::Receiver<SessionEvent>) -> SessionEvent {
    timeout(EVENT_WAIT, rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

#[tokio::test]
async fn submit_appends_user_then_echo_reply_in_order() {
    let (controller, mut rx) = controller_with_channel();

    let id = controller.submit("hello").await.unwrap().unwrap();

    match next_event(&mut rx).await {
        SessionEvent::MessageAppended { message } => {
            assert_eq!(message.role, MessageRole::User);
            assert_eq!(message.content, "hello");
            assert_eq!(message.id, id);
        }
        other => panic!("expected user message first, got {other:?}"),
    }

    // Thought and context snapshots follow synchronously.
    assert!(matches!(
        next_event(&mut rx).await,
        SessionEvent::ThoughtsUpdated { .. }
    ));
    assert!(matches!(
        next_event(&mut rx).await,
        SessionEvent::ContextUpdated { card: None }
    ));

    match next_event(&mut rx).await {
        SessionEvent::MessageAppended { message } => {
            assert_eq!(message.role, MessageRole::Assistant);
            assert_eq!(message.content, "Echo: hello");
            assert!(message.id > id, "reply id must come after the user id");
        }
        other => panic!("expected echo reply, got {other:?}"),
    }

    assert_eq!(controller.message_count().await, 2);
}

#[tokio::test]
async fn blank_submissions_are_no_ops() {
    let (controller, mut rx) = controller_with_channel();

    assert!(controller.submit("").await.unwrap().is_none());
    assert!(controller.submit("   ").await.unwrap().is_none());
    assert_eq!(controller.message_count().await, 0);

    // Nothing was scheduled either: the channel stays quiet past the delay.
    tokio::time::sleep(REPLY_DELAY * 3).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn padded_input_is_carried_verbatim_through_message_thought_and_echo() {
    let (controller, mut rx) = controller_with_channel();

    controller.submit("  hi  ").await.unwrap().unwrap();

    match next_event(&mut rx).await {
        SessionEvent::MessageAppended { message } => {
            assert_eq!(message.content, "  hi  ", "user message must keep the raw input");
        }
        other => panic!("expected user message, got {other:?}"),
    }

    match next_event(&mut rx).await {
        SessionEvent::ThoughtsUpdated { steps } => {
            assert!(steps[0].thought.contains("  hi  "));
        }
        other => panic!("expected thoughts, got {other:?}"),
    }

    let _context = next_event(&mut rx).await;

    match next_event(&mut rx).await {
        SessionEvent::MessageAppended { message } => {
            assert_eq!(message.content, "Echo:   hi  ");
        }
        other => panic!("expected echo reply, got {other:?}"),
    }
}

#[tokio::test]
async fn thought_steps_interpolate_the_submission() {
    let (controller, mut rx) = controller_with_channel();
    controller.submit("why is the sky blue").await.unwrap();

    let _user = next_event(&mut rx).await;
    match next_event(&mut rx).await {
        SessionEvent::ThoughtsUpdated { steps } => {
            assert_eq!(steps.len(), 3);
            assert!(steps[0].thought.contains("why is the sky blue"));
        }
        other => panic!("expected thoughts, got {other:?}"),
    }
}

#[tokio::test]
async fn keyword_submission_updates_context_then_reply_recomputes_it() {
    let (controller, mut rx) = controller_with_channel();
    controller.submit("What is TypeScript?").await.unwrap();

    let _user = next_event(&mut rx).await;
    let _thoughts = next_event(&mut rx).await;
    match next_event(&mut rx).await {
        SessionEvent::ContextUpdated { card } => {
            assert_eq!(card.unwrap().title, "TypeScript");
        }
        other => panic!("expected context update, got {other:?}"),
    }

    match next_event(&mut rx).await {
        SessionEvent::MessageAppended { message } => {
            assert_eq!(message.content, "Echo: What is TypeScript?");
        }
        other => panic!("expected echo reply, got {other:?}"),
    }

    // The reply text still contains the keyword, so the substring resolver
    // lands on the same card again.
    match next_event(&mut rx).await {
        SessionEvent::ContextUpdated { card } => {
            assert_eq!(card.unwrap().title, "TypeScript");
        }
        other => panic!("expected context recompute, got {other:?}"),
    }
}

#[tokio::test]
async fn overlapping_submissions_keep_ids_monotonic() {
    let (controller, mut rx) = controller_with_channel();

    let first = controller.submit("first").await.unwrap().unwrap();
    let second = controller.submit("second").await.unwrap().unwrap();
    assert!(second > first);

    // Drain until both replies have landed.
    let mut reply_ids = Vec::new();
    while reply_ids.len() < 2 {
        if let SessionEvent::MessageAppended { message } = next_event(&mut rx).await {
            if message.role == MessageRole::Assistant {
                reply_ids.push(message.id);
            }
        }
    }
    assert!(reply_ids.iter().all(|&id| id > second));
    assert_eq!(controller.message_count().await, 4);
}

#[tokio::test]
async fn shutdown_cancels_pending_replies() {
    let (controller, mut rx) = controller_with_channel();

    controller.submit("never echoed").await.unwrap();
    controller.shutdown();

    tokio::time::sleep(REPLY_DELAY * 3).await;
    assert_eq!(controller.message_count().await, 1);

    // Only the synchronous submit events ever arrive.
    let mut appended = 0;
    while let Ok(event) = rx.try_recv() {
        if matches!(event, SessionEvent::MessageAppended { .. }) {
            appended += 1;
        }
    }
    assert_eq!(appended, 1);
}

#[tokio::test]
async fn feedback_acknowledges_once_and_first_vote_wins() {
    let (controller, mut rx) = controller_with_channel();

    let id = controller.submit("rate me").await.unwrap().unwrap();

    assert!(controller.record_feedback(id, true).await);
    assert!(!controller.record_feedback(id, false).await);
    assert_eq!(controller.feedback_for(id).await, Some(true));

    // Exactly one acknowledgment notice was published.
    let mut acks = 0;
    tokio::time::sleep(REPLY_DELAY * 3).await;
    while let Ok(event) = rx.try_recv() {
        if let SessionEvent::Notice { notice } = event {
            assert_eq!(notice.kind, NoticeKind::Ack);
            assert!(notice.dismiss_after_ms.is_some());
            acks += 1;
        }
    }
    assert_eq!(acks, 1);
}
