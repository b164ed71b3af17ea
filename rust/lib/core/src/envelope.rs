use serde::Serialize;

/// `status` value on every successful response.
pub const STATUS_SUCCESS: &str = "success";
/// `status` value on every failed response.
pub const STATUS_ERROR: &str = "error";

/// The fixed response shape the dashboard clients parse.
///
/// Every endpoint answers HTTP 200 with `status` ("success" / "error")
/// and a human-readable `message`; per-endpoint payload fields are
/// flattened alongside them:
///
/// ```json
/// {"status": "success", "message": "2 devices", "devices": [...]}
/// ```
///
/// Clients branch on `status`, never on the HTTP status code.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    #[serde(flatten)]
    pub body: T,
}

/// Payload for envelopes that carry no extra fields.
///
/// `()` does not flatten under serde; an empty struct does.
#[derive(Debug, Serialize)]
pub struct Empty {}

impl<T: Serialize> Envelope<T> {
    pub fn success(message: impl Into<String>, body: T) -> Self {
        Envelope {
            status: STATUS_SUCCESS,
            message: message.into(),
            body,
        }
    }
}

impl Envelope<Empty> {
    /// Success envelope with only `status` and `message`.
    pub fn ok(message: impl Into<String>) -> Self {
        Envelope::success(message, Empty {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Count {
        count: usize,
    }

    #[test]
    fn payload_fields_are_flattened() {
        let env = Envelope::success("1 reading", Count { count: 1 });
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "success", "message": "1 reading", "count": 1})
        );
    }

    #[test]
    fn ok_has_no_extra_fields() {
        let json = serde_json::to_value(Envelope::ok("device deleted")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "success", "message": "device deleted"})
        );
    }
}
