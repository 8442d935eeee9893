use serde::{Deserialize, Serialize};

/// What an invocation hands back to its caller: `{ "statusCode", "body" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    pub fn success() -> Self {
        Self {
            status_code: 200,
            body: "Success".to_string(),
        }
    }

    /// Pass an upstream rejection through with its own status.
    pub fn upstream(status: u16, status_text: &str) -> Self {
        Self {
            status_code: status,
            body: status_text.to_string(),
        }
    }

    /// 500 with `{"msg": ...}`, plus the failing stage when known.
    pub fn failure(msg: &str, stage: Option<&str>) -> Self {
        let body = match stage {
            Some(stage) => serde_json::json!({ "msg": msg, "stage": stage }),
            None => serde_json::json!({ "msg": msg }),
        };
        Self {
            status_code: 500,
            body: body.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_status() {
        let json = serde_json::to_value(InvocationResponse::success()).unwrap();
        assert_eq!(json, serde_json::json!({ "statusCode": 200, "body": "Success" }));
    }

    #[test]
    fn failure_body_is_json() {
        let r = InvocationResponse::failure("boom", Some("notify"));
        assert_eq!(r.status_code, 500);
        let body: serde_json::Value = serde_json::from_str(&r.body).unwrap();
        assert_eq!(body["msg"], "boom");
        assert_eq!(body["stage"], "notify");
        assert!(!r.is_success());
    }
}
