use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Rejection reason code
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// 仍有未完成菜品
    UnfinishedItems,
    /// 未付清余额
    UnpaidBalance,
    /// 小费金额非法
    InvalidTip,
    /// 支付处理中
    PaymentInProgress,
    /// 厨房正在出单
    KitchenMidFire,
    /// 会话未开启
    SessionNotOpen,
    /// 座位上仍有菜品
    SeatHasItems,
    /// 座位号已被占用
    SeatNumberTaken,
    /// 不能删除最后一个座位
    LastSeat,
    /// 波次中仍有菜品
    WaveHasItems,
    /// 只能删除最后一个波次 / 至少保留一个波次
    NotLastWave,
    /// Code this client does not know yet
    Other(String),
}

impl RejectReason {
    pub fn code(&self) -> &str {
        match self {
            RejectReason::UnfinishedItems => "unfinished_items",
            RejectReason::UnpaidBalance => "unpaid_balance",
            RejectReason::InvalidTip => "invalid_tip",
            RejectReason::PaymentInProgress => "payment_in_progress",
            RejectReason::KitchenMidFire => "kitchen_mid_fire",
            RejectReason::SessionNotOpen => "session_not_open",
            RejectReason::SeatHasItems => "seat_has_items",
            RejectReason::SeatNumberTaken => "seat_number_taken",
            RejectReason::LastSeat => "last_seat",
            RejectReason::WaveHasItems => "wave_has_items",
            RejectReason::NotLastWave => "not_last_wave",
            RejectReason::Other(code) => code,
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "unfinished_items" => RejectReason::UnfinishedItems,
            "unpaid_balance" => RejectReason::UnpaidBalance,
            "invalid_tip" => RejectReason::InvalidTip,
            "payment_in_progress" => RejectReason::PaymentInProgress,
            "kitchen_mid_fire" => RejectReason::KitchenMidFire,
            "session_not_open" => RejectReason::SessionNotOpen,
            "seat_has_items" => RejectReason::SeatHasItems,
            "seat_number_taken" => RejectReason::SeatNumberTaken,
            "last_seat" => RejectReason::LastSeat,
            "wave_has_items" => RejectReason::WaveHasItems,
            "not_last_wave" => RejectReason::NotLastWave,
            other => RejectReason::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for RejectReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl<'de> Deserialize<'de> for RejectReason {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(RejectReason::from_code(&code))
    }
}

/// Structured detail the backend may attach to a rejection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RejectionDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_due: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tip: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave_number: Option<u32>,
}

/// A typed refusal, local or from the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rejection {
    pub reason: RejectReason,
    /// Server-supplied message; shown verbatim when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub details: RejectionDetail,
}

impl Rejection {
    pub fn new(reason: RejectReason) -> Self {
        Self {
            reason,
            message: None,
            details: RejectionDetail::default(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_details(mut self, details: RejectionDetail) -> Self {
        self.details = details;
        self
    }

    /// Human-readable message for staff
    pub fn user_message(&self) -> String {
        if let Some(message) = self.message.as_deref().filter(|m| !m.trim().is_empty()) {
            return message.to_string();
        }

        let d = &self.details;
        match &self.reason {
            RejectReason::UnfinishedItems => match d.item_count {
                Some(n) => format!("{n} item(s) are still in progress and must be served or voided first"),
                None => "Some items are still in progress and must be served or voided first".into(),
            },
            RejectReason::UnpaidBalance => match (d.amount_due, d.amount_paid) {
                (Some(due), Some(paid)) => format!(
                    "Payment of {paid} does not cover the balance of {due}"
                ),
                (Some(due), None) => format!("Outstanding balance of {due} must be paid"),
                _ => "The bill has an unpaid balance".into(),
            },
            RejectReason::InvalidTip => match d.max_tip {
                Some(max) => format!("Tip amount is invalid (maximum {max})"),
                None => "Tip amount is invalid".into(),
            },
            RejectReason::PaymentInProgress => {
                "A payment for this table is already being processed".into()
            }
            RejectReason::KitchenMidFire => {
                "The kitchen is still receiving a fired wave, try again in a moment".into()
            }
            RejectReason::SessionNotOpen => "This table has no open session".into(),
            RejectReason::SeatHasItems => match d.seat_number {
                Some(n) => format!("Seat {n} still has items and cannot be removed"),
                None => "The seat still has items and cannot be removed".into(),
            },
            RejectReason::SeatNumberTaken => match d.seat_number {
                Some(n) => format!("Seat number {n} is already in use"),
                None => "That seat number is already in use".into(),
            },
            RejectReason::LastSeat => "A table needs at least one seat".into(),
            RejectReason::WaveHasItems => match d.wave_number {
                Some(n) => format!("Wave {n} still has items and cannot be removed"),
                None => "The wave still has items and cannot be removed".into(),
            },
            RejectReason::NotLastWave => {
                "Only the last wave can be removed, and at least one wave must remain".into()
            }
            RejectReason::Other(code) => format!("Request was rejected ({code})"),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.reason, self.user_message())
    }
}

impl std::error::Error for Rejection {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes_round_trip() {
        for code in [
            "unfinished_items",
            "unpaid_balance",
            "invalid_tip",
            "payment_in_progress",
            "kitchen_mid_fire",
            "session_not_open",
            "seat_has_items",
            "seat_number_taken",
        ] {
            assert_eq!(RejectReason::from_code(code).code(), code);
        }
        assert_eq!(
            RejectReason::from_code("table_on_fire"),
            RejectReason::Other("table_on_fire".into())
        );
    }

    #[test]
    fn test_server_message_wins() {
        let r = Rejection::new(RejectReason::SeatHasItems).with_message("Seat 3 has 2 open items");
        assert_eq!(r.user_message(), "Seat 3 has 2 open items");
    }

    #[test]
    fn test_message_uses_structured_detail() {
        let r = Rejection::new(RejectReason::UnpaidBalance).with_details(RejectionDetail {
            amount_due: Some(Decimal::new(4250, 2)),
            amount_paid: Some(Decimal::new(4000, 2)),
            ..Default::default()
        });
        assert_eq!(r.user_message(), "Payment of 40.00 does not cover the balance of 42.50");

        let r = Rejection::new(RejectReason::UnfinishedItems).with_details(RejectionDetail {
            item_count: Some(3),
            ..Default::default()
        });
        assert!(r.user_message().starts_with("3 item(s)"));
    }

    #[test]
    fn test_rejection_deserializes_from_backend_body() {
        let json = r#"{"reason":"invalid_tip","details":{"maxTip":"10.00"}}"#;
        let r: Rejection = serde_json::from_str(json).unwrap();
        assert_eq!(r.reason, RejectReason::InvalidTip);
        assert_eq!(r.details.max_tip, Some(Decimal::new(1000, 2)));
    }
}
