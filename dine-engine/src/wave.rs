//! Wave resolver
//!
//! Derives the wave number of an item. Precedence:
//!
//! 1. explicit `wave_number` field
//! 2. first "Wave N" tag (case-insensitive) in modifiers / notes
//! 3. legacy category mapping (drinks → 1, food → 2, dessert → 3)
//! 4. default 1
//!
//! Resolution is total and idempotent. The tag and category steps only exist
//! to import legacy records: once an item is in local state its wave lives in
//! the typed [`OrderItem::wave`] field.

use regex::Regex;
use shared::{DraftItem, ItemRecord, OrderItem, WaveNumber};
use std::sync::LazyLock;

/// Wave used when nothing else applies
pub const DEFAULT_WAVE: WaveNumber = 1;

static WAVE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bwave\s*#?\s*(\d+)\b").expect("wave tag regex is valid"));

/// Parse the first "Wave N" tag in `text`
pub fn parse_wave_tag(text: &str) -> Option<WaveNumber> {
    let captures = WAVE_TAG.captures(text)?;
    captures
        .get(1)?
        .as_str()
        .parse::<WaveNumber>()
        .ok()
        .filter(|n| *n >= 1)
}

/// Legacy category → wave mapping
pub fn category_wave(category: &str) -> Option<WaveNumber> {
    match category.trim().to_ascii_lowercase().as_str() {
        "drink" | "drinks" | "beverage" | "beverages" => Some(1),
        "food" | "main" | "mains" => Some(2),
        "dessert" | "desserts" => Some(3),
        _ => None,
    }
}

fn resolve<'a>(
    explicit: Option<WaveNumber>,
    tagged: impl IntoIterator<Item = &'a str>,
    category: Option<&str>,
) -> WaveNumber {
    explicit
        .filter(|n| *n >= 1)
        .or_else(|| tagged.into_iter().find_map(parse_wave_tag))
        .or_else(|| category.and_then(category_wave))
        .unwrap_or(DEFAULT_WAVE)
}

/// Wave number of a backend item record
pub fn wave_number(record: &ItemRecord) -> WaveNumber {
    resolve(
        record.wave_number,
        record.modifiers.iter().map(String::as_str),
        record.category.as_deref(),
    )
}

/// Wave number of a draft, whose legacy tag lives in its notes.
///
/// `category` comes from the menu catalog lookup.
pub fn draft_wave_number(draft: &DraftItem, category: Option<&str>) -> WaveNumber {
    resolve(draft.wave_number, draft.notes.as_deref(), category)
}

/// Import a backend record into local state, resolving its wave once
pub fn import_record(record: ItemRecord) -> OrderItem {
    let wave = wave_number(&record);
    OrderItem {
        id: record.id,
        menu_item_id: record.menu_item_id,
        name: record.name,
        unit_price: record.unit_price,
        quantity: record.quantity,
        wave,
        status: record.status,
        modifiers: record.modifiers,
        notes: record.notes,
        eta_minutes: record.eta_minutes,
    }
}
