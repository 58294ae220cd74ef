use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use eframe::egui;
use egui::{Color32, CornerRadius, RichText, ScrollArea, Ui, ViewportBuilder};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hn_top_stories::{ClientConfig, FetchError, HackerNewsClient, LoadState, StoriesController, Story};

mod theme;

use crate::theme::AppTheme;

const SEARCH_INPUT_ID: &str = "search_input";
const SKELETON_CARDS: usize = 9;
const CARD_MIN_WIDTH: f32 = 340.0;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("hn_top_stories=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("hn-fetch")
        .build()?;
    let config = ClientConfig::default();
    let story_limit = config.story_limit;
    let client = HackerNewsClient::new(config)?;

    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([480.0, 400.0])
            .with_title("Hacker News Top Stories"),
        ..Default::default()
    };

    eframe::run_native(
        "Hacker News Top Stories",
        options,
        Box::new(move |cc| {
            // Saved theme preference, dark by default
            let is_dark_mode = cc
                .storage
                .and_then(|storage| storage.get_string("is_dark_mode"))
                .and_then(|value| value.parse::<bool>().ok())
                .unwrap_or(true);

            let controller =
                StoriesController::new(Arc::new(client), story_limit, runtime.handle().clone());

            Ok(Box::new(TopStoriesApp::new(
                controller,
                runtime,
                is_dark_mode,
                &cc.egui_ctx,
            )))
        }),
    )
    .map_err(|e| anyhow!("failed to run the window: {e}"))
}

enum View {
    Loading,
    Failed(FetchError),
    Loaded,
}

struct TopStoriesApp {
    controller: StoriesController,
    // Dropped after the controller so its tasks are aborted first
    _runtime: tokio::runtime::Runtime,
    theme: AppTheme,
    is_dark_mode: bool,
    needs_repaint: bool,
    focus_search: bool,
}

impl TopStoriesApp {
    fn new(
        mut controller: StoriesController,
        runtime: tokio::runtime::Runtime,
        is_dark_mode: bool,
        ctx: &egui::Context,
    ) -> Self {
        let repaint_ctx = ctx.clone();
        controller.set_waker(move || repaint_ctx.request_repaint());
        controller.load();

        Self {
            controller,
            _runtime: runtime,
            theme: AppTheme::new(is_dark_mode),
            is_dark_mode,
            needs_repaint: false,
            focus_search: false,
        }
    }

    fn reload(&mut self) {
        info!("reload requested");
        self.controller.load();
        self.needs_repaint = true;
    }

    fn toggle_theme(&mut self) {
        self.is_dark_mode = !self.is_dark_mode;
        self.theme = AppTheme::new(self.is_dark_mode);
        self.needs_repaint = true;
    }

    fn open_link(&self, url: &str) {
        if let Err(e) = open::that(url) {
            warn!(%url, error = %e, "failed to open link");
        }
    }

    fn process_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        let (focus, escape, reload) = ctx.input(|i| {
            (
                i.modifiers.command && i.key_pressed(egui::Key::F),
                i.key_pressed(egui::Key::Escape),
                i.key_pressed(egui::Key::F5) || (i.modifiers.command && i.key_pressed(egui::Key::R)),
            )
        });

        if focus {
            self.focus_search = true;
        }
        if escape && !self.controller.query().is_empty() {
            self.controller.clear_query();
            self.needs_repaint = true;
        }
        if reload {
            self.reload();
        }
    }

    fn render_header(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading(
                RichText::new("Hacker News Top 100 Stories")
                    .color(self.theme.highlight)
                    .size(24.0),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let theme_icon = if self.is_dark_mode { "☀" } else { "☾" };
                let theme_btn = ui
                    .add(
                        egui::Button::new(
                            RichText::new(theme_icon)
                                .color(self.theme.button_foreground)
                                .size(20.0),
                        )
                        .min_size(egui::vec2(32.0, 32.0))
                        .corner_radius(CornerRadius::same(16))
                        .fill(self.theme.button_background),
                    )
                    .on_hover_text(if self.is_dark_mode {
                        "Switch to Light Mode"
                    } else {
                        "Switch to Dark Mode"
                    });
                if theme_btn.clicked() {
                    self.toggle_theme();
                }

                ui.add_space(8.0);

                let refresh_btn = ui
                    .add_enabled(
                        !self.controller.state().is_loading(),
                        egui::Button::new(
                            RichText::new("↻")
                                .color(self.theme.button_foreground)
                                .size(20.0),
                        )
                        .min_size(egui::vec2(32.0, 32.0))
                        .corner_radius(CornerRadius::same(16))
                        .fill(self.theme.button_background),
                    )
                    .on_hover_text("Reload (F5)");
                if refresh_btn.clicked() {
                    self.reload();
                }
            });
        });
    }

    fn render_search_bar(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            let clear_width = if self.controller.query().is_empty() { 0.0 } else { 70.0 };
            let text_edit = ui.add_sized(
                [ui.available_width() - clear_width, 32.0],
                egui::TextEdit::singleline(self.controller.query_mut())
                    .hint_text("Search stories...")
                    .text_color(self.theme.text)
                    .frame(true)
                    .id(egui::Id::new(SEARCH_INPUT_ID)),
            );

            if self.focus_search {
                text_edit.request_focus();
                self.focus_search = false;
            }

            if !self.controller.query().is_empty() {
                ui.add_space(8.0);
                let clear_btn = ui.add_sized(
                    [60.0, 28.0],
                    egui::Button::new(
                        RichText::new("Clear")
                            .color(self.theme.button_foreground)
                            .size(14.0),
                    )
                    .fill(self.theme.button_background),
                );
                if clear_btn.clicked() {
                    self.controller.clear_query();
                }
            }
        });

        if !self.controller.query().is_empty() && self.controller.state().stories().is_some() {
            ui.add_space(4.0);
            ui.label(
                RichText::new(format!(
                    "Found {} results from {} stories",
                    self.controller.visible_stories().len(),
                    self.controller.total_stories()
                ))
                .color(self.theme.secondary_text)
                .size(14.0)
                .italics(),
            );
        }
    }

    fn render_loading(&self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(RichText::new("Loading stories...").color(self.theme.secondary_text));
        });
        ui.add_space(8.0);

        let columns = column_count(ui.available_width());
        ui.columns(columns, |cols| {
            for i in 0..SKELETON_CARDS {
                skeleton_card(&mut cols[i % columns], &self.theme);
            }
        });
    }

    fn render_error(&mut self, ui: &mut Ui, err: &FetchError) {
        ui.vertical_centered(|ui| {
            ui.add_space(80.0);
            ui.label(
                RichText::new(err.summary())
                    .color(self.theme.error)
                    .size(20.0)
                    .strong(),
            );
            ui.add_space(6.0);
            ui.label(
                RichText::new(err.to_string())
                    .color(self.theme.secondary_text)
                    .size(13.0),
            );
            ui.add_space(16.0);
            if ui.button(RichText::new("Try again").size(16.0)).clicked() {
                self.reload();
            }
        });
    }

    fn render_stories(&mut self, ui: &mut Ui) {
        let visible = self.controller.visible_stories();

        if visible.is_empty() {
            let message = if self.controller.query().is_empty() {
                "No stories available right now.".to_string()
            } else {
                format!("No results found for '{}'", self.controller.query())
            };
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);
                ui.label(
                    RichText::new(message)
                        .color(self.theme.secondary_text)
                        .size(18.0)
                        .italics(),
                );
            });
            return;
        }

        let now = Utc::now();
        let mut link_to_open = None;

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let columns = column_count(ui.available_width());
                ui.columns(columns, |cols| {
                    for (i, story) in visible.iter().enumerate() {
                        if let Some(link) = story_card(&mut cols[i % columns], &self.theme, story, now) {
                            link_to_open = Some(link);
                        }
                    }
                });
            });

        if let Some(link) = link_to_open {
            self.open_link(&link);
        }
    }
}

impl eframe::App for TopStoriesApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        storage.set_string("is_dark_mode", self.is_dark_mode.to_string());
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.theme.apply_to_ctx(ctx);

        if self.controller.poll() {
            self.needs_repaint = true;
        }

        self.process_keyboard_shortcuts(ctx);

        if self.needs_repaint {
            ctx.request_repaint();
            self.needs_repaint = false;
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_header(ui);
            ui.add(egui::Separator::default().spacing(12.0));
            self.render_search_bar(ui);
            ui.add_space(8.0);

            let view = match self.controller.state() {
                LoadState::Loading => View::Loading,
                LoadState::Failed(err) => View::Failed(err.clone()),
                LoadState::Loaded(_) => View::Loaded,
            };
            match view {
                View::Loading => self.render_loading(ui),
                View::Failed(err) => self.render_error(ui, &err),
                View::Loaded => self.render_stories(ui),
            }
        });
    }
}

impl Drop for TopStoriesApp {
    fn drop(&mut self) {
        self.controller.teardown();
    }
}

fn column_count(width: f32) -> usize {
    ((width / CARD_MIN_WIDTH) as usize).clamp(1, 3)
}

fn card_frame(theme: &AppTheme, fill: Color32, score: i64) -> egui::Frame {
    egui::Frame::new()
        .fill(fill)
        .corner_radius(CornerRadius::same(8))
        .stroke(theme.card_stroke(score))
        .inner_margin(12.0)
        .outer_margin(egui::vec2(4.0, 6.0))
}

fn skeleton_bar(ui: &mut Ui, theme: &AppTheme, fraction: f32) {
    let width = ui.available_width() * fraction;
    let (rect, _) = ui.allocate_exact_size(egui::vec2(width, 14.0), egui::Sense::hover());
    ui.painter().rect_filled(rect, CornerRadius::same(4), theme.skeleton);
}

fn skeleton_card(ui: &mut Ui, theme: &AppTheme) {
    card_frame(theme, theme.card_background, 0).show(ui, |ui| {
        ui.set_width(ui.available_width());
        skeleton_bar(ui, theme, 0.75);
        ui.add_space(14.0);
        skeleton_bar(ui, theme, 0.25);
        ui.add_space(8.0);
        skeleton_bar(ui, theme, 0.5);
    });
}

/// Draws one story. Returns the link to open if "Read more" was clicked.
fn story_card(ui: &mut Ui, theme: &AppTheme, story: &Story, now: DateTime<Utc>) -> Option<String> {
    let mut clicked = None;

    card_frame(theme, theme.card_background(story.score), story.score).show(ui, |ui| {
        ui.set_width(ui.available_width());

        ui.add(
            egui::Label::new(
                RichText::new(story.title())
                    .color(theme.title_color(story.score))
                    .size(16.0)
                    .strong(),
            )
            .wrap(),
        );
        ui.add_space(6.0);

        ui.label(
            RichText::new(format!("Upvotes: {}", story.score))
                .color(theme.score_color(story.score))
                .size(14.0),
        );

        let mut meta = Vec::new();
        if let Some(by) = &story.by {
            meta.push(format!("by {}", by));
        }
        let age = story.time_ago(now);
        if !age.is_empty() {
            meta.push(age);
        }
        meta.push(format!("{} comments", story.comments_count()));
        if let Some(domain) = story.domain() {
            meta.push(domain);
        }
        ui.label(
            RichText::new(meta.join(" · "))
                .color(theme.secondary_text)
                .size(13.0),
        );
        ui.add_space(8.0);

        let read_more = ui.add(
            egui::Button::new(RichText::new("Read more").color(theme.button_foreground))
                .fill(theme.button_background),
        );
        if read_more.clicked() {
            clicked = Some(story.link());
        }
        if read_more.hovered() {
            ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
        }
    });

    clicked
}
