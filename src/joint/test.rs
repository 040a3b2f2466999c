#[cfg(test)]
mod abstract_joint_tests {
    use crate::connection::{decode_frame, SinkAdapter, StreamAdapter};
    use crate::dispatcher::RoomHub;
    use crate::error::StreamError;
    use crate::joint::AbstractJoint;
    use crate::message::ClientEvent;
    use crate::response::Response;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex as StdMutex};
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    struct MockSink {
        responses: Arc<StdMutex<Vec<Response>>>,
    }

    #[async_trait]
    impl SinkAdapter for MockSink {
        async fn send(
            &mut self,
            response: Response,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.responses.lock().unwrap().push(response);
            Ok(())
        }
    }

    struct MockStream {
        frames: VecDeque<String>,
    }

    impl MockStream {
        fn new(frames: Vec<String>) -> Self {
            MockStream {
                frames: frames.into(),
            }
        }
    }

    #[async_trait]
    impl StreamAdapter for MockStream {
        async fn next(&mut self) -> Result<ClientEvent, StreamError> {
            match self.frames.pop_front() {
                Some(frame) => decode_frame(&frame),
                None => Err(StreamError::Closed),
            }
        }
    }

    fn frame(event: &ClientEvent) -> String {
        serde_json::to_string(event).unwrap()
    }

    #[tokio::test]
    async fn test_handle_stream_lifecycle() {
        let joint: AbstractJoint<RoomHub, MockSink> = AbstractJoint::new(RoomHub::default());
        let responses = Arc::new(StdMutex::new(Vec::new()));
        let sink = MockSink {
            responses: responses.clone(),
        };
        let mut stream = MockStream::new(vec![
            frame(&ClientEvent::join_room("movie", "alice")),
            "not json".to_string(),
            frame(&ClientEvent::send_message("movie", "still here")),
        ]);

        let client_id = joint.handle_stream(&mut stream, sink).await;

        let responses = responses.lock().unwrap();
        assert_eq!(responses.len(), 4);
        assert_eq!(responses[0], Response::Connected(client_id));
        assert!(matches!(&responses[1], Response::RoomState(_)));
        assert!(matches!(&responses[2], Response::ClientError(_)));
        assert!(matches!(&responses[3], Response::NewMessage(m) if m.text == "still here"));

        // closed stream tore the room down
        let reducer = joint.broadcaster().get_reducer();
        assert!(!reducer.lock().await.registry().contains_room("movie"));
    }

    #[tokio::test]
    async fn test_closing_connection_notifies_room() {
        let joint: Arc<AbstractJoint<RoomHub, MockSink>> =
            Arc::new(AbstractJoint::new(RoomHub::default()));

        // alice stays connected: her stream never ends
        let alice_log = Arc::new(StdMutex::new(Vec::new()));
        let alice_sink = MockSink {
            responses: alice_log.clone(),
        };
        joint.broadcaster().register(1_000_000, alice_sink).await;
        joint
            .broadcaster()
            .process_event(1_000_000, ClientEvent::join_room("movie", "alice"))
            .await;

        let bob_sink = MockSink {
            responses: Arc::new(StdMutex::new(Vec::new())),
        };
        let mut bob_stream = MockStream::new(vec![frame(&ClientEvent::join_room("movie", "bob"))]);
        let bob = joint.handle_stream(&mut bob_stream, bob_sink).await;

        // alice's writer task runs on its own, give it a moment
        let alice = timeout(Duration::from_secs(1), async {
            loop {
                let snapshot = alice_log.lock().unwrap().clone();
                if snapshot.len() >= 3 {
                    return snapshot;
                }
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("Timed out waiting for alice");
        assert!(matches!(&alice[1], Response::UserJoined(u) if u.id == bob));
        assert_eq!(alice[2], Response::UserLeft(bob));
    }
}
