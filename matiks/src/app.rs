//! Application state for the TUI.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use crossterm::event::{KeyCode, KeyEvent};
use matiks_core::analytics::DashboardView;
use matiks_core::config::InsightConfig;
use matiks_core::{filter_options, ingest, render, DatasetCache, Dimension, FilterOptions};
use matiks_core::{FilterSelection, LoadedDataset};

use crate::cli;

/// Content tab shown to the right of the filter sidebar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentTab {
    #[default]
    Activity,
    Revenue,
    Breakdowns,
    Insights,
}

impl ContentTab {
    pub const ALL: [ContentTab; 4] = [
        ContentTab::Activity,
        ContentTab::Revenue,
        ContentTab::Breakdowns,
        ContentTab::Insights,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ContentTab::Activity => "Activity",
            ContentTab::Revenue => "Revenue",
            ContentTab::Breakdowns => "Breakdowns",
            ContentTab::Insights => "Insights",
        }
    }

    fn index(&self) -> usize {
        match self {
            ContentTab::Activity => 0,
            ContentTab::Revenue => 1,
            ContentTab::Breakdowns => 2,
            ContentTab::Insights => 3,
        }
    }

    fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn previous(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Main application state.
pub struct App {
    /// Dataset location on disk
    source: PathBuf,
    /// Currently loaded dataset and its load report
    pub loaded: Arc<LoadedDataset>,
    /// Values offered by each filter list
    pub options: FilterOptions,
    /// Current filter selection
    pub selection: FilterSelection,
    /// Filter list receiving cursor keys
    pub focus: Dimension,
    /// Cursor position in each filter list, indexed like `Dimension::ALL`
    cursors: [usize; 3],
    /// Active content tab
    pub tab: ContentTab,
    /// Scroll offset for the insights text
    pub scroll_offset: u16,
    /// Last computed view
    pub view: DashboardView,
    /// Fixed reference time; wall-clock time when `None`
    fixed_now: Option<NaiveDateTime>,
    insight_config: InsightConfig,
    /// Transient message for the footer
    pub status: Option<String>,
    /// Whether the app should exit
    pub should_quit: bool,
    /// Animation tick counter
    pub tick_count: u64,
    /// Tick at which the dataset was last reloaded
    reload_tick: Option<u64>,
}

impl App {
    /// Load the dataset at `source` and compute the initial view.
    pub fn new(
        source: PathBuf,
        fixed_now: Option<NaiveDateTime>,
        insight_config: InsightConfig,
    ) -> Result<Self> {
        let loaded = ingest::load(&source)
            .with_context(|| format!("failed to load dataset from {}", source.display()))?;
        Ok(Self::with_dataset(source, loaded, fixed_now, insight_config))
    }

    /// Build the app around an already-loaded dataset.
    pub fn with_dataset(
        source: PathBuf,
        loaded: Arc<LoadedDataset>,
        fixed_now: Option<NaiveDateTime>,
        insight_config: InsightConfig,
    ) -> Self {
        let selection = FilterSelection::new();
        let now = fixed_now.unwrap_or_else(cli::wall_clock);
        let view = render(&loaded.dataset, &selection, now, &insight_config);

        Self {
            source,
            options: filter_options(&loaded.dataset),
            loaded,
            selection,
            focus: Dimension::Country,
            cursors: [0; 3],
            tab: ContentTab::default(),
            scroll_offset: 0,
            view,
            fixed_now,
            insight_config,
            status: None,
            should_quit: false,
            tick_count: 0,
            reload_tick: None,
        }
    }

    /// Recompute the view for the current selection.
    pub fn recompute(&mut self) {
        let now = self.fixed_now.unwrap_or_else(cli::wall_clock);
        self.view = render(
            &self.loaded.dataset,
            &self.selection,
            now,
            &self.insight_config,
        );
    }

    /// Handle keyboard input.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.cycle_focus(1);
            }
            KeyCode::BackTab => {
                self.cycle_focus(Dimension::ALL.len() - 1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_cursor(1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_cursor(-1);
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.cursors[focus_index(self.focus)] = 0;
            }
            KeyCode::End | KeyCode::Char('G') => {
                let len = self.options.values(self.focus).len();
                self.cursors[focus_index(self.focus)] = len.saturating_sub(1);
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.toggle_current();
            }
            KeyCode::Char('c') => {
                self.selection.clear_dimension(self.focus);
                self.recompute();
            }
            KeyCode::Char('C') => {
                self.selection.clear();
                self.recompute();
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.set_tab(self.tab.next());
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.set_tab(self.tab.previous());
            }
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                self.set_tab(ContentTab::ALL[index]);
            }
            KeyCode::PageDown | KeyCode::Char('d') => {
                self.scroll_offset = self.scroll_offset.saturating_add(5);
            }
            KeyCode::PageUp | KeyCode::Char('u') => {
                self.scroll_offset = self.scroll_offset.saturating_sub(5);
            }
            KeyCode::Char('r') => {
                self.force_reload();
            }
            _ => {}
        }
    }

    fn set_tab(&mut self, tab: ContentTab) {
        self.tab = tab;
        self.scroll_offset = 0;
    }

    fn cycle_focus(&mut self, step: usize) {
        let next = (focus_index(self.focus) + step) % Dimension::ALL.len();
        self.focus = Dimension::ALL[next];
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.options.values(self.focus).len();
        if len == 0 {
            return;
        }
        let cursor = &mut self.cursors[focus_index(self.focus)];
        *cursor = if delta < 0 {
            cursor.saturating_sub(delta.unsigned_abs())
        } else {
            (*cursor + delta as usize).min(len - 1)
        };
    }

    /// Cursor position in the list for `dimension`.
    pub fn cursor(&self, dimension: Dimension) -> usize {
        self.cursors[focus_index(dimension)]
    }

    /// Toggle the value under the cursor of the focused list.
    fn toggle_current(&mut self) {
        let Some(value) = self
            .options
            .values(self.focus)
            .get(self.cursor(self.focus))
            .cloned()
        else {
            return;
        };
        self.selection.toggle(self.focus, &value);
        self.recompute();
    }

    /// Returns true if the dataset file changed since it was loaded.
    pub fn check_for_updates(&self) -> bool {
        DatasetCache::global().is_stale(&self.source)
    }

    /// Reload the dataset through the cache and recompute.
    ///
    /// Selected values that no longer occur in the data are dropped.
    pub fn reload(&mut self) -> Result<()> {
        let loaded = ingest::load(&self.source)
            .with_context(|| format!("failed to reload {}", self.source.display()))?;
        self.loaded = loaded;
        self.options = filter_options(&self.loaded.dataset);

        for dimension in Dimension::ALL {
            let stale: Vec<String> = self
                .selection
                .values(dimension)
                .iter()
                .filter(|v| !self.options.values(dimension).contains(*v))
                .cloned()
                .collect();
            for value in stale {
                self.selection.toggle(dimension, &value);
            }
            let len = self.options.values(dimension).len();
            let cursor = &mut self.cursors[focus_index(dimension)];
            *cursor = (*cursor).min(len.saturating_sub(1));
        }

        self.recompute();
        self.reload_tick = Some(self.tick_count);
        tracing::info!(
            records = self.loaded.dataset.len(),
            "Dashboard reloaded dataset"
        );
        Ok(())
    }

    /// Drop the cached dataset and load it again from disk.
    fn force_reload(&mut self) {
        DatasetCache::global().invalidate(&self.source);
        match self.reload() {
            Ok(()) => self.status = Some("Dataset reloaded".to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Reload failed");
                self.status = Some(format!("Reload failed: {e:#}"));
            }
        }
    }

    /// Advance the animation tick.
    pub fn tick(&mut self) {
        self.tick_count = self.tick_count.wrapping_add(1);
    }

    /// Returns true if the reload indicator should be shown (within ~2 seconds of a reload).
    pub fn should_show_reload_indicator(&self) -> bool {
        self.reload_tick
            .is_some_and(|tick| self.tick_count.wrapping_sub(tick) < 20)
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

fn focus_index(dimension: Dimension) -> usize {
    match dimension {
        Dimension::Country => 0,
        Dimension::GameTitle => 1,
        Dimension::SubscriptionTier => 2,
    }
}
