use crate::application::Settings;
use crate::domain::market_data::DatasetStats;
use leptos::*;
use once_cell::sync::OnceCell;

pub struct Globals {
    pub status: RwSignal<String>,
    pub settings: RwSignal<Settings>,
    pub stats: RwSignal<DatasetStats>,
    pub visible_stats: RwSignal<DatasetStats>,
    pub visible_range: RwSignal<Option<(usize, usize)>>,
    pub csv_input: RwSignal<String>,
    pub log_lines: RwSignal<Vec<String>>,
    pub log_paused: RwSignal<bool>,
}

static GLOBALS: OnceCell<Globals> = OnceCell::new();

pub fn globals() -> &'static Globals {
    GLOBALS.get_or_init(|| Globals {
        status: create_rw_signal(String::new()),
        settings: create_rw_signal(Settings::default()),
        stats: create_rw_signal(DatasetStats::default()),
        visible_stats: create_rw_signal(DatasetStats::default()),
        visible_range: create_rw_signal(None),
        csv_input: create_rw_signal(String::new()),
        log_lines: create_rw_signal(Vec::new()),
        log_paused: create_rw_signal(false),
    })
}
