#[cfg(test)]
mod tests {
    use crate::connection::{decode_frame, encode_response, SinkAdapter, StreamAdapter};
    use crate::error::StreamError;
    use crate::message::ClientEvent;
    use crate::response::Response;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    struct MockSink {
        responses: Arc<Mutex<Vec<Response>>>,
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

    #[async_trait]
    impl StreamAdapter for MockStream {
        async fn next(&mut self) -> Result<ClientEvent, StreamError> {
            match self.frames.pop_front() {
                Some(frame) => decode_frame(&frame),
                None => Err(StreamError::Closed),
            }
        }
    }

    #[tokio::test]
    async fn test_sink_adapter() {
        let responses = Arc::new(Mutex::new(Vec::new()));
        let mut sink = MockSink {
            responses: responses.clone(),
        };

        let result = sink.send(Response::UserLeft(3)).await;
        assert!(result.is_ok());

        let stored = responses.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0], Response::UserLeft(3));
    }

    #[tokio::test]
    async fn test_stream_adapter() {
        let join = serde_json::to_string(&ClientEvent::join_room("movie", "alice")).unwrap();
        let mut stream = MockStream {
            frames: VecDeque::from(vec![join, "garbage".to_string()]),
        };

        match stream.next().await {
            Ok(ClientEvent::JoinRoom(p)) => {
                assert_eq!(p.room_id, "movie");
                assert_eq!(p.user.name, "alice");
            }
            other => panic!("Expected JoinRoom, got {:?}", other),
        }

        let err = stream.next().await.unwrap_err();
        assert!(err.is_recoverable());

        let err = stream.next().await.unwrap_err();
        assert!(matches!(err, StreamError::Closed));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_decode_unknown_event_is_malformed() {
        let frame = r#"{"event":"self-destruct","data":{}}"#;
        assert!(matches!(decode_frame(frame), Err(StreamError::Malformed(_))));
    }

    #[test]
    fn test_encode_response() {
        let frame = encode_response(&Response::UserLeft(8)).unwrap();
        assert_eq!(frame, r#"{"event":"user-left","data":8}"#);
    }
}
