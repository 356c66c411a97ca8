//! Fixed-format receipts for settled bookings.
//!
//! No tax is computed here; a receipt only numbers the settlement and
//! optionally attaches a QR code for registry lookups.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use image::{ImageFormat, Luma};
use qrcode::QrCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::services::SettlementResult;

/// Receipt numbering and QR settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptConfig {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_qr_enabled")]
    pub qr_enabled: bool,
}

fn default_prefix() -> String {
    "RCP".to_string()
}

fn default_qr_enabled() -> bool {
    true
}

impl Default for ReceiptConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            qr_enabled: default_qr_enabled(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReceiptError {
    #[error("QR encoding failed: {0}")]
    Qr(#[from] qrcode::types::QrError),

    #[error("PNG encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// A settlement with its receipt metadata attached.
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub receipt_number: String,
    pub issued_at: DateTime<Utc>,
    pub settlement: SettlementResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code_png_base64: Option<String>,
}

/// `{prefix}-{YYYYMMDD}-{first 8 hex digits of id}`
pub fn receipt_number(prefix: &str, issued_at: DateTime<Utc>, id: Uuid) -> String {
    let hex = id.simple().to_string().to_uppercase();
    format!("{}-{}-{}", prefix, issued_at.format("%Y%m%d"), &hex[..8])
}

/// Issue a receipt for `settlement`. The caller supplies both the timestamp and
/// the id so the output is reproducible.
pub fn issue_receipt(
    config: &ReceiptConfig,
    settlement: SettlementResult,
    issued_at: DateTime<Utc>,
    id: Uuid,
) -> Result<Receipt, ReceiptError> {
    let receipt_number = receipt_number(&config.prefix, issued_at, id);

    let qr_code_png_base64 = if config.qr_enabled {
        let payload = format!(
            "{}|{}|{}",
            receipt_number,
            settlement.final_price.amount(),
            settlement.final_price.currency()
        );
        Some(render_qr_png_base64(&payload)?)
    } else {
        None
    };

    Ok(Receipt {
        receipt_number,
        issued_at,
        settlement,
        qr_code_png_base64,
    })
}

fn render_qr_png_base64(payload: &str) -> Result<String, ReceiptError> {
    let code = QrCode::new(payload.as_bytes())?;
    let rendered = code.render::<Luma<u8>>().build();

    let mut png = Cursor::new(Vec::new());
    rendered.write_to(&mut png, ImageFormat::Png)?;

    Ok(STANDARD.encode(png.into_inner()))
}
