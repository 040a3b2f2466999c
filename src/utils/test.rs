#[cfg(test)]
mod tests {
    use crate::message::ClientEvent;
    use crate::response::Response;
    use crate::utils::types::{Broadcastable, Receivable};
    use crate::utils::{get_id, random_room_id};
    use serde::de::DeserializeOwned;

    #[test]
    fn test_get_id() {
        let id1 = get_id();
        let id2 = get_id();
        let id3 = get_id();

        assert!(id1 < id2);
        assert!(id2 < id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_random_room_id() {
        let id = random_room_id(8);
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));

        // zero length is bumped so a room id is never empty
        assert_eq!(random_room_id(0).len(), 1);

        assert_ne!(random_room_id(16), random_room_id(16));
    }

    fn round_trip<T: Broadcastable + DeserializeOwned>(value: &T) -> T {
        let json = serde_json::to_string(value).unwrap();
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_wire_types_are_marked() {
        let response = Response::UserLeft(7);
        assert_eq!(round_trip(&response), response);

        // inbound events only ever need to be receivable
        fn receivable<T: Receivable>() {}
        receivable::<ClientEvent>();
    }
}
