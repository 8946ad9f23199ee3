//! Chat message formatting (Telegram MarkdownV2)

use chrono::{DateTime, Utc};

use crate::shared::types::{Asset, PriceQuote};
use crate::shared::utils::{escape_code, escape_markdown, format_price};

const SEPARATOR: &str = "─────────────────────────";

/// Announcement for one newly listed asset
pub fn new_asset_message(asset: &Asset) -> String {
    let name = asset.name.as_deref().unwrap_or("N/A");
    format!(
        "🌟✨ New token detected\\! 📊 Monitoring price\\.\\.\\. 📈\n\n\
         🚀 *Token Name*: {}\n\
         🔖 *Symbol*: {}\n\
         💠 *ID*: `{}`\n\
         {}\n",
        escape_markdown(name),
        escape_markdown(&asset.symbol),
        escape_code(&asset.id),
        SEPARATOR,
    )
}

/// One digest with a block per priced asset; header only when nothing was priced
pub fn price_digest_message(quotes: &[PriceQuote], at: DateTime<Utc>) -> String {
    let mut message = format!(
        "🔔 *Latest Token Prices Update* 🔔\n_{}_\n\n",
        escape_markdown(&at.format("%Y-%m-%d %H:%M UTC").to_string())
    );
    for quote in quotes {
        message.push_str(&format!(
            "📊 *Pair*: `{}` / `{}`\n💲 *Price*: `{}`\n\n",
            escape_code(&quote.base_symbol),
            escape_code(&quote.quote_symbol),
            format_price(quote.price),
        ));
    }
    message
}

pub fn welcome_message() -> String {
    "Welcome to the trading bot\\. You will be notified about new tokens and their prices\\.\n\
     Use `/swap <mint>` to buy a token with your saved settings\\."
        .to_string()
}

pub fn swap_usage_message() -> String {
    "Usage: `/swap <mint>`".to_string()
}

pub fn swap_settings_missing_message() -> String {
    "No swap settings saved for you yet\\. Ask the operator to run `jupwatch settings set`\\.".to_string()
}

pub fn swap_submitted_message(signature: &str) -> String {
    format!(
        "✅ Swap submitted\\.\n🧾 *Signature*: `{}`\n_Submission is not confirmation of finality\\._",
        escape_code(signature)
    )
}

pub fn swap_failed_message(kind: &str, reason: &str) -> String {
    format!(
        "❌ Swap failed at *{}* step\\.\n{}",
        escape_markdown(kind),
        escape_markdown(reason)
    )
}
