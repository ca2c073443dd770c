//! ReadReceipt entity <-> model mapper

use campus_core::entities::ReadReceipt;
use campus_core::value_objects::Snowflake;

use crate::models::ReadReceiptModel;

/// Convert ReadReceiptModel to ReadReceipt entity
impl From<ReadReceiptModel> for ReadReceipt {
    fn from(model: ReadReceiptModel) -> Self {
        ReadReceipt {
            message_id: Snowflake::new(model.message_id),
            user_id: Snowflake::new(model.user_id),
            read_at: model.read_at,
        }
    }
}
