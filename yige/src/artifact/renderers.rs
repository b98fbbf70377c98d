//! Artifact renderers
//!
//! One renderer type per style. A renderer decides the rendering variant the
//! view layer draws and the text that goes on the keepsake.

use super::style::ArtifactStyle;
use crate::database::{DayRecord, Mood, Weather};
use chrono::{Datelike, NaiveDate, Timelike, Weekday};
use serde::Serialize;

/// Text laid out on a keepsake
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactDescription {
    pub headline: String,
    pub date_stamp: String,
    pub details: Vec<String>,
    pub mood_label: &'static str,
    pub weather_label: Option<&'static str>,
    pub place: Option<String>,
}

pub trait ArtifactRenderer: Send + Sync {
    fn style(&self) -> ArtifactStyle;

    /// Identifier of the view variant that draws this style
    fn variant(&self) -> &'static str;

    fn display_name(&self) -> &'static str;

    /// chrono format string for the date stamp
    fn date_format(&self) -> &'static str {
        "%Y.%m.%d"
    }

    /// Longest headline the layout fits, in characters
    fn headline_chars(&self) -> usize {
        24
    }

    /// Style-specific lines, e.g. a flight number or a track listing
    fn details(&self, _record: &DayRecord) -> Vec<String> {
        Vec::new()
    }

    fn describe(&self, record: &DayRecord) -> ArtifactDescription {
        ArtifactDescription {
            headline: headline(&record.content, self.headline_chars()),
            date_stamp: record.day.format(self.date_format()).to_string(),
            details: self.details(record),
            mood_label: record.mood.label(),
            weather_label: weather_of(record).map(|w| w.label()),
            place: place_of(record),
        }
    }
}

/// First non-empty line, cut to `max_chars` with an ellipsis
pub fn headline(content: &str, max_chars: usize) -> String {
    let line = content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or_default();

    if line.chars().count() <= max_chars {
        return line.to_string();
    }

    let mut cut: String = line.chars().take(max_chars.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// The user's pick wins over the collected snapshot
fn weather_of(record: &DayRecord) -> Option<Weather> {
    record.weather.or_else(|| {
        record
            .metadata
            .as_ref()
            .and_then(|m| m.weather.as_ref())
            .map(|w| w.condition)
    })
}

fn place_of(record: &DayRecord) -> Option<String> {
    let location = record.metadata.as_ref()?.location.as_ref()?;
    location
        .place_name
        .clone()
        .or_else(|| location.address.clone())
}

fn weekday_cn(day: NaiveDate) -> &'static str {
    match day.weekday() {
        Weekday::Mon => "周一",
        Weekday::Tue => "周二",
        Weekday::Wed => "周三",
        Weekday::Thu => "周四",
        Weekday::Fri => "周五",
        Weekday::Sat => "周六",
        Weekday::Sun => "周日",
    }
}

fn mood_index(mood: Mood) -> usize {
    Mood::ALL.iter().position(|m| *m == mood).unwrap_or(0)
}

// ===== Photography =====

pub struct Polaroid;

impl ArtifactRenderer for Polaroid {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::Polaroid
    }
    fn variant(&self) -> &'static str {
        "polaroid_frame"
    }
    fn display_name(&self) -> &'static str {
        "拍立得"
    }
    fn date_format(&self) -> &'static str {
        "'%y %-m %-d"
    }
    fn headline_chars(&self) -> usize {
        16
    }
}

pub struct FilmStrip;

impl ArtifactRenderer for FilmStrip {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::FilmStrip
    }
    fn variant(&self) -> &'static str {
        "film_strip_negative"
    }
    fn display_name(&self) -> &'static str {
        "胶片底片"
    }
    fn details(&self, record: &DayRecord) -> Vec<String> {
        let frame = record.day.ordinal() % 36 + 1;
        vec![format!("FRAME {:02}A", frame), "ISO 400".to_string()]
    }
}

pub struct PhotoBooth;

impl ArtifactRenderer for PhotoBooth {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::PhotoBooth
    }
    fn variant(&self) -> &'static str {
        "photo_booth_strip"
    }
    fn display_name(&self) -> &'static str {
        "大头贴"
    }
    fn headline_chars(&self) -> usize {
        12
    }
    fn details(&self, _record: &DayRecord) -> Vec<String> {
        vec!["4 × 1".to_string()]
    }
}

pub struct SlideMount;

impl ArtifactRenderer for SlideMount {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::SlideMount
    }
    fn variant(&self) -> &'static str {
        "slide_mount_35mm"
    }
    fn display_name(&self) -> &'static str {
        "幻灯片"
    }
    fn date_format(&self) -> &'static str {
        "%b %Y"
    }
    fn headline_chars(&self) -> usize {
        14
    }
}

pub struct ContactSheet;

impl ArtifactRenderer for ContactSheet {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::ContactSheet
    }
    fn variant(&self) -> &'static str {
        "contact_sheet_grid"
    }
    fn display_name(&self) -> &'static str {
        "印样"
    }
    fn details(&self, record: &DayRecord) -> Vec<String> {
        vec![format!("ROLL {:02}", record.day.iso_week().week())]
    }
}

pub struct Daguerreotype;

impl ArtifactRenderer for Daguerreotype {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::Daguerreotype
    }
    fn variant(&self) -> &'static str {
        "daguerreotype_plate"
    }
    fn display_name(&self) -> &'static str {
        "银版相片"
    }
    fn date_format(&self) -> &'static str {
        "%Y年%m月%d日"
    }
}

// ===== Tickets =====

pub struct BoardingPass;

impl ArtifactRenderer for BoardingPass {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::BoardingPass
    }
    fn variant(&self) -> &'static str {
        "boarding_pass"
    }
    fn display_name(&self) -> &'static str {
        "登机牌"
    }
    fn date_format(&self) -> &'static str {
        "%d%b%y"
    }
    fn details(&self, record: &DayRecord) -> Vec<String> {
        let seat_letter = ['A', 'B', 'C', 'D', 'E', 'F'][mood_index(record.mood) % 6];
        vec![
            "FROM 昨天 TO 今天".to_string(),
            format!("FLIGHT YG{}", record.day.format("%m%d")),
            format!("GATE {}", record.day.weekday().number_from_monday()),
            format!("SEAT {}{}", record.day.day(), seat_letter),
        ]
    }
}

pub struct MovieTicket;

impl ArtifactRenderer for MovieTicket {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::MovieTicket
    }
    fn variant(&self) -> &'static str {
        "movie_ticket_stub"
    }
    fn display_name(&self) -> &'static str {
        "电影票"
    }
    fn details(&self, record: &DayRecord) -> Vec<String> {
        vec![
            format!(
                "场次 {:02}:{:02}",
                record.created_at.hour(),
                record.created_at.minute()
            ),
            format!("{} 号厅", record.day.weekday().number_from_monday()),
        ]
    }
}

pub struct ConcertTicket;

impl ArtifactRenderer for ConcertTicket {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::ConcertTicket
    }
    fn variant(&self) -> &'static str {
        "concert_ticket"
    }
    fn display_name(&self) -> &'static str {
        "演出票"
    }
    fn headline_chars(&self) -> usize {
        18
    }
    fn details(&self, record: &DayRecord) -> Vec<String> {
        vec![
            "ADMIT ONE".to_string(),
            format!("SECTION {}", record.mood.as_str().to_uppercase()),
        ]
    }
}

pub struct TrainTicket;

impl ArtifactRenderer for TrainTicket {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::TrainTicket
    }
    fn variant(&self) -> &'static str {
        "train_ticket"
    }
    fn display_name(&self) -> &'static str {
        "火车票"
    }
    fn date_format(&self) -> &'static str {
        "%Y年%m月%d日"
    }
    fn details(&self, record: &DayRecord) -> Vec<String> {
        vec![
            format!("G{}次", record.day.format("%m%d")),
            format!("{} 开", weekday_cn(record.day)),
        ]
    }
}

pub struct Receipt;

impl ArtifactRenderer for Receipt {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::Receipt
    }
    fn variant(&self) -> &'static str {
        "thermal_receipt"
    }
    fn display_name(&self) -> &'static str {
        "小票"
    }
    fn date_format(&self) -> &'static str {
        "%Y-%m-%d"
    }
    fn headline_chars(&self) -> usize {
        20
    }
    fn details(&self, record: &DayRecord) -> Vec<String> {
        let mut lines = vec![format!("心情 {} ×1", record.mood.label())];
        if let Some(weather) = weather_of(record) {
            lines.push(format!("天气 {} ×1", weather.label()));
        }
        lines.push(format!("字数 {}", record.content.chars().count()));
        lines.push("TOTAL 1 DAY".to_string());
        lines
    }
}

pub struct MuseumPass;

impl ArtifactRenderer for MuseumPass {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::MuseumPass
    }
    fn variant(&self) -> &'static str {
        "museum_pass"
    }
    fn display_name(&self) -> &'static str {
        "展览门票"
    }
    fn details(&self, record: &DayRecord) -> Vec<String> {
        vec![format!("EXHIBIT No.{:03}", record.day.ordinal())]
    }
}

// ===== Letters =====

pub struct WaxSealEnvelope;

impl ArtifactRenderer for WaxSealEnvelope {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::WaxSealEnvelope
    }
    fn variant(&self) -> &'static str {
        "wax_seal_envelope"
    }
    fn display_name(&self) -> &'static str {
        "火漆信封"
    }
    fn headline_chars(&self) -> usize {
        30
    }
    fn details(&self, record: &DayRecord) -> Vec<String> {
        vec![format!("SEALED {}", record.day.format("%Y.%m.%d"))]
    }
}

pub struct Postcard;

impl ArtifactRenderer for Postcard {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::Postcard
    }
    fn variant(&self) -> &'static str {
        "postcard"
    }
    fn display_name(&self) -> &'static str {
        "明信片"
    }
    fn headline_chars(&self) -> usize {
        40
    }
    fn details(&self, record: &DayRecord) -> Vec<String> {
        let from = place_of(record).unwrap_or_else(|| "某处".to_string());
        vec![format!("寄自 {}", from)]
    }
}

pub struct Telegram;

impl ArtifactRenderer for Telegram {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::Telegram
    }
    fn variant(&self) -> &'static str {
        "telegram_form"
    }
    fn display_name(&self) -> &'static str {
        "电报"
    }
    fn date_format(&self) -> &'static str {
        "%d %b %Y"
    }
    fn details(&self, record: &DayRecord) -> Vec<String> {
        // Telegrams were billed per word
        let words = record.content.split_whitespace().count().max(1);
        vec![format!("{} WORDS STOP", words)]
    }
}

pub struct Airmail;

impl ArtifactRenderer for Airmail {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::Airmail
    }
    fn variant(&self) -> &'static str {
        "airmail_letter"
    }
    fn display_name(&self) -> &'static str {
        "航空信"
    }
    fn details(&self, record: &DayRecord) -> Vec<String> {
        let mut lines = vec!["PAR AVION".to_string()];
        if let Some(place) = place_of(record) {
            lines.push(place);
        }
        lines
    }
}

pub struct JournalPage;

impl ArtifactRenderer for JournalPage {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::JournalPage
    }
    fn variant(&self) -> &'static str {
        "journal_page"
    }
    fn display_name(&self) -> &'static str {
        "日记页"
    }
    fn date_format(&self) -> &'static str {
        "%Y年%m月%d日"
    }
    fn headline_chars(&self) -> usize {
        48
    }
    fn details(&self, record: &DayRecord) -> Vec<String> {
        vec![
            weekday_cn(record.day).to_string(),
            format!("第 {} 页", record.day.ordinal()),
        ]
    }
}

pub struct Typewriter;

impl ArtifactRenderer for Typewriter {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::Typewriter
    }
    fn variant(&self) -> &'static str {
        "typewriter_sheet"
    }
    fn display_name(&self) -> &'static str {
        "打字机"
    }
    fn date_format(&self) -> &'static str {
        "%Y-%m-%d"
    }
    fn headline_chars(&self) -> usize {
        36
    }
    fn details(&self, record: &DayRecord) -> Vec<String> {
        vec![format!("{} 字", record.content.chars().count())]
    }
}

// ===== Collection =====

pub struct VinylRecord;

impl ArtifactRenderer for VinylRecord {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::VinylRecord
    }
    fn variant(&self) -> &'static str {
        "vinyl_record"
    }
    fn display_name(&self) -> &'static str {
        "黑胶唱片"
    }
    fn headline_chars(&self) -> usize {
        20
    }
    fn details(&self, record: &DayRecord) -> Vec<String> {
        vec![
            "SIDE A".to_string(),
            "33⅓ RPM".to_string(),
            format!("TRACK 1 · {}", headline(&record.content, 12)),
        ]
    }
}

pub struct Cassette;

impl ArtifactRenderer for Cassette {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::Cassette
    }
    fn variant(&self) -> &'static str {
        "cassette_tape"
    }
    fn display_name(&self) -> &'static str {
        "磁带"
    }
    fn headline_chars(&self) -> usize {
        18
    }
    fn details(&self, _record: &DayRecord) -> Vec<String> {
        vec!["SIDE A · 60 MIN".to_string()]
    }
}

pub struct PressedFlower;

impl ArtifactRenderer for PressedFlower {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::PressedFlower
    }
    fn variant(&self) -> &'static str {
        "pressed_flower_card"
    }
    fn display_name(&self) -> &'static str {
        "押花"
    }
    fn details(&self, record: &DayRecord) -> Vec<String> {
        // Flower of the month
        const FLOWERS: [&str; 12] = [
            "梅花", "杏花", "桃花", "牡丹", "石榴花", "荷花", "凤仙花", "桂花", "菊花", "芙蓉",
            "山茶", "水仙",
        ];
        vec![FLOWERS[record.day.month0() as usize].to_string()]
    }
}

pub struct PostageStamp;

impl ArtifactRenderer for PostageStamp {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::PostageStamp
    }
    fn variant(&self) -> &'static str {
        "postage_stamp"
    }
    fn display_name(&self) -> &'static str {
        "邮票"
    }
    fn headline_chars(&self) -> usize {
        10
    }
    fn details(&self, record: &DayRecord) -> Vec<String> {
        vec![format!("{}分", record.day.day() * 10)]
    }
}

pub struct Bookmark;

impl ArtifactRenderer for Bookmark {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::Bookmark
    }
    fn variant(&self) -> &'static str {
        "bookmark_ribbon"
    }
    fn display_name(&self) -> &'static str {
        "书签"
    }
    fn headline_chars(&self) -> usize {
        12
    }
}

pub struct MessageInBottle;

impl ArtifactRenderer for MessageInBottle {
    fn style(&self) -> ArtifactStyle {
        ArtifactStyle::MessageInBottle
    }
    fn variant(&self) -> &'static str {
        "message_in_bottle"
    }
    fn display_name(&self) -> &'static str {
        "漂流瓶"
    }
    fn details(&self, record: &DayRecord) -> Vec<String> {
        let shore = place_of(record).unwrap_or_else(|| "海边".to_string());
        vec![format!("写于 {}", shore)]
    }
}

/// The renderer for a style.
///
/// Keep this match free of a wildcard arm so a new style cannot compile
/// without a renderer.
pub fn renderer_for(style: ArtifactStyle) -> &'static dyn ArtifactRenderer {
    match style {
        ArtifactStyle::Polaroid => &Polaroid,
        ArtifactStyle::FilmStrip => &FilmStrip,
        ArtifactStyle::PhotoBooth => &PhotoBooth,
        ArtifactStyle::SlideMount => &SlideMount,
        ArtifactStyle::ContactSheet => &ContactSheet,
        ArtifactStyle::Daguerreotype => &Daguerreotype,
        ArtifactStyle::BoardingPass => &BoardingPass,
        ArtifactStyle::MovieTicket => &MovieTicket,
        ArtifactStyle::ConcertTicket => &ConcertTicket,
        ArtifactStyle::TrainTicket => &TrainTicket,
        ArtifactStyle::Receipt => &Receipt,
        ArtifactStyle::MuseumPass => &MuseumPass,
        ArtifactStyle::WaxSealEnvelope => &WaxSealEnvelope,
        ArtifactStyle::Postcard => &Postcard,
        ArtifactStyle::Telegram => &Telegram,
        ArtifactStyle::Airmail => &Airmail,
        ArtifactStyle::JournalPage => &JournalPage,
        ArtifactStyle::Typewriter => &Typewriter,
        ArtifactStyle::VinylRecord => &VinylRecord,
        ArtifactStyle::Cassette => &Cassette,
        ArtifactStyle::PressedFlower => &PressedFlower,
        ArtifactStyle::PostageStamp => &PostageStamp,
        ArtifactStyle::Bookmark => &Bookmark,
        ArtifactStyle::MessageInBottle => &MessageInBottle,
    }
}
