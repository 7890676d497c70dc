use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use eframe::{egui, App, Frame};
use egui::epaint::text::cursor::CCursor;
use egui::text_edit::CCursorRange;
use egui::{Align2, Color32, FontFamily, FontId, Key, Modifiers, RichText, TextStyle};
use ika_assets::AssetManager;
use ika_core::{ChunkError, ChunkSet, Document, Language, OutputLog, MAX_CHUNKS, MIN_CHUNKS};
use ika_highlight::{HighlightPalette, Highlighter};
use ika_preview::{PreviewRenderer, TextEchoSurface};
use ika_runexec::{RunOutcome, Runner, RunnerConfig, SystemLauncher};
use ika_settings::{IdeConfig, SnippetError, SnippetStore};
use rfd::FileDialog;
use tracing::{error, info, warn};

use crate::editor_view;

const COLOR_BG: Color32 = Color32::from_rgb(0x11, 0x11, 0x11);
const COLOR_PANEL: Color32 = Color32::from_rgb(0x0d, 0x0d, 0x0d);
const COLOR_PANEL_DARK: Color32 = Color32::from_rgb(0x16, 0x16, 0x16);
const COLOR_ACCENT: Color32 = Color32::from_rgb(0x2a, 0x2a, 0x2a);
const COLOR_ACCENT_HOVER: Color32 = Color32::from_rgb(0x3a, 0x3a, 0x3a);
const COLOR_TEXT: Color32 = Color32::from_rgb(0xe0, 0xe0, 0xe0);
const COLOR_MUTED: Color32 = Color32::from_rgb(0x6a, 0x6a, 0x6a);
const COLOR_OUTPUT_BG: Color32 = Color32::from_rgb(0x0e, 0x0e, 0x0e);
const COLOR_OUTPUT_TEXT: Color32 = Color32::from_rgb(0x11, 0xdd, 0x66);
const COLOR_LINENO_TEXT: Color32 = Color32::from_rgb(0x55, 0x55, 0x55);

const ABOUT_TEXT: &str = "IKA mini IDE\n\n\
Features:\n\
• Python + HTML support\n\
• HTML live preview\n\
• Chunk editor\n\
• Snippets\n\
• Image manager\n\
• Full dark theme";

fn editor_id() -> egui::Id {
    egui::Id::new("ika_editor")
}

struct InfoDialog {
    title: String,
    message: String,
}

/// Name prompt shown after "Add Snippet"; the selection is captured up front.
struct SnippetPrompt {
    name: String,
    body: String,
}

#[derive(Default)]
struct ChunkEditorState {
    open: bool,
    count_input: String,
    chunks: Option<ChunkSet>,
}

pub struct IkaApp {
    document: Document,
    highlighter: Highlighter,
    palette: HighlightPalette,
    font_size: f32,
    show_line_numbers: bool,
    preview: PreviewRenderer<TextEchoSurface>,
    output: OutputLog,
    runner: Runner<SystemLauncher>,
    snippets: SnippetStore,
    snippet_list: BTreeMap<String, String>,
    assets: AssetManager,
    image_names: Vec<String>,
    info: Option<InfoDialog>,
    snippet_prompt: Option<SnippetPrompt>,
    show_snippets: bool,
    show_images: bool,
    show_language_selector: bool,
    chunk_editor: ChunkEditorState,
    applied_title: String,
}

impl IkaApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: IdeConfig) -> Self {
        let palette = config.editor.palette().unwrap_or_else(|err| {
            warn!(%err, "invalid syntax colours in config, using defaults");
            HighlightPalette::default()
        });

        let mut output = OutputLog::new();
        let repaint_ctx = cc.egui_ctx.clone();
        output.set_waker(Arc::new(move || repaint_ctx.request_repaint()));
        output.append_line("IKA ready.");

        let runner = Runner::new(
            RunnerConfig::new(
                config.runner.interpreter.clone(),
                config.paths.run_dir.clone(),
            ),
            SystemLauncher::detached(),
        );

        let font_size = config.editor.font_size as f32;
        apply_style(&cc.egui_ctx, font_size);

        Self {
            document: Document::new(),
            highlighter: Highlighter::new(),
            palette,
            font_size,
            show_line_numbers: config.editor.show_line_numbers,
            preview: PreviewRenderer::new(TextEchoSurface::new(), config.preview.debounce()),
            output,
            runner,
            snippets: SnippetStore::new(config.paths.snippets_root.clone()),
            snippet_list: BTreeMap::new(),
            assets: AssetManager::new(config.paths.assets_dir.clone()),
            image_names: Vec::new(),
            info: None,
            snippet_prompt: None,
            show_snippets: false,
            show_images: false,
            show_language_selector: false,
            chunk_editor: ChunkEditorState::default(),
            applied_title: String::new(),
        }
    }

    fn show_info(&mut self, title: &str, message: impl Into<String>) {
        self.info = Some(InfoDialog {
            title: title.to_string(),
            message: message.into(),
        });
    }

    fn report_error(&mut self, context: &str, err: &dyn std::error::Error) {
        error!(%err, "{context}");
        self.output.append_line(format!("[Error] {context}: {err}"));
    }

    /// Bookkeeping after the buffer text changed.
    fn after_edit(&mut self) {
        self.document.mark_dirty();
        self.preview.on_edit(self.document.language(), Instant::now());
    }

    fn set_language(&mut self, language: Language) {
        self.document.set_language(language);
        self.preview.on_edit(language, Instant::now());
        self.refresh_snippets();
        self.output
            .append_line(format!("Language set to {}.", language.display_name()));
    }

    fn replace_document(&mut self, document: Document) {
        self.document = document;
        self.preview.on_edit(self.document.language(), Instant::now());
        self.refresh_snippets();
    }

    fn insert_text(&mut self, ctx: &egui::Context, text: &str) {
        self.document.insert_at_caret(text);
        let caret = self.document.caret().position();
        if let Some(mut state) = egui::TextEdit::load_state(ctx, editor_id()) {
            state.set_ccursor_range(Some(CCursorRange::one(CCursor::new(caret))));
            state.store(ctx, editor_id());
        }
        self.after_edit();
    }

    // ---- File menu ----

    fn new_file(&mut self) {
        self.replace_document(Document::new());
        self.output.append_line("New file.");
    }

    /// Loads `path` at startup, reporting failures in the output log.
    pub fn open_path(&mut self, path: PathBuf) {
        match Document::open(&path) {
            Ok(document) => {
                self.output.append_line(format!("Opened {}", path.display()));
                self.replace_document(document);
            }
            Err(err) => self.report_error("could not open file", &err),
        }
    }

    fn open_file(&mut self) {
        let Some(path) = FileDialog::new()
            .add_filter("Python", &["py"])
            .add_filter("HTML", &["html"])
            .add_filter("All files", &["*"])
            .pick_file()
        else {
            return;
        };
        info!(path = %path.display(), "opening file");
        self.open_path(path);
    }

    fn save_file(&mut self) {
        if self.document.path().is_none() {
            self.save_file_as();
            return;
        }
        match self.document.save() {
            Ok(()) => self.log_saved(),
            Err(err) => self.report_error("could not save file", &err),
        }
    }

    fn save_file_as(&mut self) {
        let extension = self.document.default_extension();
        let Some(path) = FileDialog::new()
            .set_file_name(format!("untitled.{extension}"))
            .add_filter(self.document.language().display_name(), &[extension])
            .add_filter("All files", &["*"])
            .save_file()
        else {
            return;
        };
        match self.document.save_as(&path) {
            Ok(()) => self.log_saved(),
            Err(err) => self.report_error("could not save file", &err),
        }
    }

    fn log_saved(&mut self) {
        if let Some(path) = self.document.path() {
            let line = format!("Saved {}", path.display());
            self.output.append_line(line);
        }
    }

    // ---- Edit menu ----

    fn begin_add_snippet(&mut self) {
        match self.document.selected_text() {
            Some(selection) => {
                self.snippet_prompt = Some(SnippetPrompt {
                    name: String::new(),
                    body: selection.to_string(),
                });
            }
            None => self.show_info("Snippet", "Select text first."),
        }
    }

    fn finish_add_snippet(&mut self, prompt: SnippetPrompt) {
        let language = self.document.language();
        match self.snippets.save(language, &prompt.name, &prompt.body) {
            Ok(_) => {
                let name = prompt.name.trim().to_string();
                self.refresh_snippets();
                self.show_info("Snippet", format!("Snippet '{name}' saved!"));
            }
            Err(err) if err.is_validation() => self.show_info("Snippet", err.to_string()),
            Err(err) => self.report_error("could not save snippet", &err),
        }
    }

    fn refresh_snippets(&mut self) {
        match self.snippets.list(self.document.language()) {
            Ok(list) => self.snippet_list = list,
            Err(err) => {
                self.report_error("could not read snippets", &err);
                self.snippet_list = ika_settings::builtin_snippets(self.document.language())
                    .iter()
                    .map(|(name, body)| (name.to_string(), body.to_string()))
                    .collect();
            }
        }
    }

    fn remove_snippet(&mut self, name: &str) {
        match self.snippets.remove(self.document.language(), name) {
            Ok(()) => self.refresh_snippets(),
            Err(err @ (SnippetError::BuiltinReadOnly(_) | SnippetError::NotFound(_))) => {
                self.show_info("Snippet", err.to_string())
            }
            Err(err) => self.report_error("could not remove snippet", &err),
        }
    }

    fn create_chunks(&mut self) {
        let parsed = self.chunk_editor.count_input.trim().parse::<usize>();
        let result = match parsed {
            Ok(count) => ChunkSet::create(count),
            Err(_) => Err(ChunkError::CountOutOfRange(0)),
        };
        match result {
            Ok(chunks) => self.chunk_editor.chunks = Some(chunks),
            Err(_) => self.show_info(
                "Chunks",
                format!("Enter a whole number between {MIN_CHUNKS} and {MAX_CHUNKS}."),
            ),
        }
    }

    fn stitch_chunks(&mut self) {
        let Some(chunks) = self.chunk_editor.chunks.as_ref() else {
            return;
        };
        match self.document.stitch_from(chunks) {
            Ok(()) => {
                self.preview.on_edit(self.document.language(), Instant::now());
                self.output
                    .append_line(format!("Stitched {} chunks into the editor.", chunks.len()));
                self.chunk_editor = ChunkEditorState::default();
            }
            Err(ChunkError::NothingToStitch) => self.show_info("Chunks", "No chunks to stitch."),
            Err(err) => self.show_info("Chunks", err.to_string()),
        }
    }

    // ---- Tools menu ----

    fn run_code(&mut self) {
        let sink = self.output.sink();
        match self
            .runner
            .run(self.document.language(), self.document.contents(), &sink)
        {
            Ok(RunOutcome::Started { script }) => {
                info!(script = %script.display(), "run started");
            }
            Ok(_) => {}
            Err(err) => self.report_error("run failed", &err),
        }
    }

    fn refresh_images(&mut self) {
        match self.assets.list() {
            Ok(names) => self.image_names = names,
            Err(err) => self.report_error("could not list images", &err),
        }
    }

    fn add_image(&mut self) {
        let Some(source) = FileDialog::new()
            .add_filter("Images", ika_assets::IMAGE_EXTENSIONS)
            .pick_file()
        else {
            return;
        };
        match self.assets.add(&source) {
            Ok(dest) => {
                self.output
                    .append_line(format!("Added image {}", dest.display()));
                self.refresh_images();
            }
            Err(err) => self.report_error("could not add image", &err),
        }
    }

    // ---- Panels ----

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (save, open, run) = ctx.input_mut(|input| {
            (
                input.consume_key(Modifiers::COMMAND, Key::S),
                input.consume_key(Modifiers::COMMAND, Key::O),
                input.consume_key(Modifiers::NONE, Key::F5),
            )
        });
        if save {
            self.save_file();
        }
        if open {
            self.open_file();
        }
        if run {
            self.run_code();
        }
    }

    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar")
            .frame(egui::Frame::none().fill(COLOR_PANEL).inner_margin(4.0))
            .show(ctx, |ui| {
                egui::menu::bar(ui, |ui| {
                    ui.menu_button("File", |ui| {
                        if ui.button("New").clicked() {
                            self.new_file();
                            ui.close_menu();
                        }
                        if ui.button("Open...").clicked() {
                            ui.close_menu();
                            self.open_file();
                        }
                        ui.separator();
                        if ui.button("Save").clicked() {
                            ui.close_menu();
                            self.save_file();
                        }
                        if ui.button("Save As...").clicked() {
                            ui.close_menu();
                            self.save_file_as();
                        }
                        ui.separator();
                        if ui.button("Exit").clicked() {
                            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });
                    ui.menu_button("Edit", |ui| {
                        if ui.button("Add Snippet").clicked() {
                            ui.close_menu();
                            self.begin_add_snippet();
                        }
                        if ui.button("Snippet Library").clicked() {
                            ui.close_menu();
                            self.refresh_snippets();
                            self.show_snippets = true;
                        }
                        ui.separator();
                        if ui.button("Chunk Editor").clicked() {
                            ui.close_menu();
                            self.chunk_editor = ChunkEditorState {
                                open: true,
                                count_input: "3".into(),
                                chunks: None,
                            };
                        }
                    });
                    ui.menu_button("Tools", |ui| {
                        if ui.button("Run").clicked() {
                            ui.close_menu();
                            self.run_code();
                        }
                        ui.separator();
                        if ui.button("Image Manager").clicked() {
                            ui.close_menu();
                            self.refresh_images();
                            self.show_images = true;
                        }
                        if ui.button("Language Selector").clicked() {
                            ui.close_menu();
                            self.show_language_selector = true;
                        }
                    });
                    ui.menu_button("Help", |ui| {
                        if ui.button("About").clicked() {
                            ui.close_menu();
                            self.show_info("About IKA", ABOUT_TEXT);
                        }
                    });
                });
            });
    }

    fn show_output_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("output")
            .resizable(true)
            .default_height(160.0)
            .frame(egui::Frame::none().fill(COLOR_PANEL_DARK).inner_margin(6.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new("Output").color(COLOR_MUTED));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("Clear").clicked() {
                            self.output.clear();
                        }
                    });
                });
                egui::Frame::none()
                    .fill(COLOR_OUTPUT_BG)
                    .inner_margin(4.0)
                    .show(ui, |ui| {
                        egui::ScrollArea::vertical()
                            .stick_to_bottom(true)
                            .auto_shrink([false, false])
                            .show(ui, |ui| {
                                let mut text = self.output.text();
                                ui.add(
                                    egui::TextEdit::multiline(&mut text)
                                        .font(FontId::monospace(self.font_size))
                                        .text_color(COLOR_OUTPUT_TEXT)
                                        .frame(false)
                                        .desired_width(f32::INFINITY),
                                );
                            });
                    });
            });
    }

    fn show_preview_panel(&mut self, ctx: &egui::Context) {
        if !PreviewRenderer::<TextEchoSurface>::visible(self.document.language()) {
            return;
        }
        egui::SidePanel::right("preview")
            .resizable(true)
            .default_width(360.0)
            .frame(egui::Frame::none().fill(COLOR_PANEL).inner_margin(6.0))
            .show(ctx, |ui| {
                ui.label(RichText::new("Preview").color(COLOR_MUTED));
                egui::Frame::none()
                    .fill(COLOR_OUTPUT_BG)
                    .inner_margin(4.0)
                    .show(ui, |ui| {
                        egui::ScrollArea::both()
                            .auto_shrink([false, false])
                            .show(ui, |ui| {
                                let mut markup = self.preview.surface().text();
                                ui.add(
                                    egui::TextEdit::multiline(&mut markup)
                                        .font(FontId::monospace(self.font_size))
                                        .frame(false)
                                        .desired_width(f32::INFINITY),
                                );
                            });
                    });
            });
    }

    fn show_editor(&mut self, ctx: &egui::Context) {
        let language = self.document.language();
        let font_id = FontId::monospace(self.font_size);
        let show_line_numbers = self.show_line_numbers;
        let gutter = editor_view::gutter_text(self.document.line_count());

        let edit = egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(COLOR_BG).inner_margin(6.0))
            .show(ctx, |ui| {
                egui::ScrollArea::both()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        ui.horizontal_top(|ui| {
                            if show_line_numbers {
                                ui.label(
                                    RichText::new(gutter)
                                        .font(font_id.clone())
                                        .color(COLOR_LINENO_TEXT),
                                );
                            }
                            let highlighter = &self.highlighter;
                            let palette = &self.palette;
                            let layout_font = font_id.clone();
                            let mut layouter = |ui: &egui::Ui, text: &str, wrap_width: f32| {
                                let tokens = highlighter.highlight(language, text);
                                let mut job = editor_view::layout_job(
                                    text,
                                    &tokens,
                                    palette,
                                    layout_font.clone(),
                                    COLOR_TEXT,
                                );
                                job.wrap.max_width = wrap_width;
                                ui.fonts(|fonts| fonts.layout_job(job))
                            };
                            let output = egui::TextEdit::multiline(self.document.contents_mut())
                                .id(editor_id())
                                .code_editor()
                                .font(font_id.clone())
                                .frame(false)
                                .desired_rows(30)
                                .desired_width(f32::INFINITY)
                                .layouter(&mut layouter)
                                .show(ui);
                            let cursor = output.cursor_range.map(|range| {
                                (range.secondary.ccursor.index, range.primary.ccursor.index)
                            });
                            (output.response.changed(), cursor)
                        })
                        .inner
                    })
                    .inner
            })
            .inner;

        let (changed, cursor) = edit;
        if changed {
            self.after_edit();
        }
        if let Some((anchor, head)) = cursor {
            self.document.select(anchor, head);
        }
    }

    // ---- Windows ----

    fn show_windows(&mut self, ctx: &egui::Context) {
        self.show_snippet_window(ctx);
        self.show_snippet_prompt(ctx);
        self.show_image_window(ctx);
        self.show_chunk_editor(ctx);
        self.show_language_window(ctx);
        self.show_info_dialog(ctx);
    }

    fn show_snippet_window(&mut self, ctx: &egui::Context) {
        let mut insert = None;
        let mut remove = None;
        let title = format!("{} Snippets", self.document.language().display_name());
        let snippet_list = &self.snippet_list;
        egui::Window::new(title)
            .id(egui::Id::new("snippet_library"))
            .open(&mut self.show_snippets)
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for (name, body) in snippet_list {
                        ui.horizontal(|ui| {
                            if ui.button("Insert").clicked() {
                                insert = Some(body.clone());
                            }
                            if ui.small_button("🗑").on_hover_text("Remove").clicked() {
                                remove = Some(name.clone());
                            }
                            ui.label(RichText::new(name).monospace());
                        });
                    }
                });
            });
        if let Some(body) = insert {
            self.insert_text(ctx, &body);
        }
        if let Some(name) = remove {
            self.remove_snippet(&name);
        }
    }

    fn show_snippet_prompt(&mut self, ctx: &egui::Context) {
        let Some(prompt) = self.snippet_prompt.as_mut() else {
            return;
        };
        let mut confirmed = false;
        let mut cancelled = false;
        egui::Window::new("Snippet name")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Snippet name:");
                let response = ui.text_edit_singleline(&mut prompt.name);
                response.request_focus();
                if response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter)) {
                    confirmed = true;
                }
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        confirmed = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancelled = true;
                    }
                });
            });
        if confirmed {
            if let Some(prompt) = self.snippet_prompt.take() {
                self.finish_add_snippet(prompt);
            }
        } else if cancelled {
            self.snippet_prompt = None;
        }
    }

    fn show_image_window(&mut self, ctx: &egui::Context) {
        let mut add = false;
        let mut insert = None;
        let names = &self.image_names;
        let assets = &self.assets;
        egui::Window::new("Image Manager")
            .open(&mut self.show_images)
            .default_width(360.0)
            .show(ctx, |ui| {
                if ui.button("Add Image").clicked() {
                    add = true;
                }
                ui.label(
                    RichText::new(assets.dir().display().to_string())
                        .small()
                        .color(COLOR_MUTED),
                );
                ui.separator();
                if names.is_empty() {
                    ui.label(RichText::new("No images yet.").color(COLOR_MUTED));
                }
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for name in names {
                        ui.horizontal(|ui| {
                            if ui.button("Insert path").clicked() {
                                insert = Some(assets.reference_for(name));
                            }
                            ui.label(RichText::new(name).monospace());
                        });
                    }
                });
            });
        if add {
            self.add_image();
        }
        if let Some(reference) = insert {
            self.insert_text(ctx, &reference);
        }
    }

    fn show_chunk_editor(&mut self, ctx: &egui::Context) {
        if !self.chunk_editor.open {
            return;
        }
        let mut open = true;
        let mut create = false;
        let mut stitch = false;
        let font_id = FontId::monospace(self.font_size);
        let state = &mut self.chunk_editor;
        egui::Window::new("Chunk Editor")
            .open(&mut open)
            .default_size([520.0, 480.0])
            .show(ctx, |ui| match state.chunks.as_mut() {
                None => {
                    ui.label(format!("How many chunks? ({MIN_CHUNKS}-{MAX_CHUNKS})"));
                    ui.horizontal(|ui| {
                        let response = ui.text_edit_singleline(&mut state.count_input);
                        if response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter))
                        {
                            create = true;
                        }
                        if ui.button("Create").clicked() {
                            create = true;
                        }
                    });
                }
                Some(chunks) => {
                    egui::ScrollArea::vertical()
                        .max_height((ui.available_height() - 36.0).max(80.0))
                        .show(ui, |ui| {
                            for (index, fragment) in chunks.iter_mut().enumerate() {
                                ui.label(
                                    RichText::new(format!("Chunk {}", index + 1)).color(COLOR_MUTED),
                                );
                                ui.add(
                                    egui::TextEdit::multiline(fragment)
                                        .font(font_id.clone())
                                        .desired_rows(4)
                                        .desired_width(f32::INFINITY),
                                );
                            }
                        });
                    ui.separator();
                    if ui.button("Stitch into editor").clicked() {
                        stitch = true;
                    }
                }
            });
        if !open {
            self.chunk_editor = ChunkEditorState::default();
            return;
        }
        if create {
            self.create_chunks();
        }
        if stitch {
            self.stitch_chunks();
        }
    }

    fn show_language_window(&mut self, ctx: &egui::Context) {
        let mut chosen = None;
        let current = self.document.language();
        egui::Window::new("Select Language")
            .open(&mut self.show_language_selector)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Choose language:");
                for language in Language::ALL {
                    if ui
                        .selectable_label(language == current, language.display_name())
                        .clicked()
                    {
                        chosen = Some(language);
                    }
                }
            });
        if let Some(language) = chosen {
            self.show_language_selector = false;
            if language != current {
                self.set_language(language);
            }
        }
    }

    fn show_info_dialog(&mut self, ctx: &egui::Context) {
        let Some(info) = self.info.as_ref() else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new(info.title.as_str())
            .id(egui::Id::new("info_dialog"))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(info.message.as_str());
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.info = None;
        }
    }

    fn tick_preview(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        let language = self.document.language();
        self.preview.tick(language, self.document.contents(), now);
        if let Some(remaining) = self.preview.remaining(now) {
            ctx.request_repaint_after(remaining);
        }
    }

    fn sync_title(&mut self, ctx: &egui::Context) {
        let title = self.document.title();
        if title != self.applied_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.applied_title = title;
        }
    }
}

impl App for IkaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.output.drain();
        self.handle_shortcuts(ctx);

        self.show_menu_bar(ctx);
        self.show_output_panel(ctx);
        self.show_preview_panel(ctx);
        self.show_editor(ctx);
        self.show_windows(ctx);

        self.tick_preview(ctx);
        self.sync_title(ctx);
    }
}

fn apply_style(ctx: &egui::Context, font_size: f32) {
    let mut visuals = egui::Visuals::dark();
    visuals.override_text_color = Some(COLOR_TEXT);
    visuals.panel_fill = COLOR_PANEL;
    visuals.window_fill = COLOR_PANEL;
    visuals.extreme_bg_color = COLOR_BG;
    visuals.faint_bg_color = COLOR_PANEL_DARK;
    visuals.widgets.inactive.bg_fill = COLOR_ACCENT;
    visuals.widgets.inactive.weak_bg_fill = COLOR_ACCENT;
    visuals.widgets.hovered.bg_fill = COLOR_ACCENT_HOVER;
    visuals.widgets.hovered.weak_bg_fill = COLOR_ACCENT_HOVER;
    visuals.widgets.active.bg_fill = COLOR_ACCENT_HOVER;
    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.text_styles.insert(
        TextStyle::Monospace,
        FontId::new(font_size, FontFamily::Monospace),
    );
    ctx.set_style(style);
}
