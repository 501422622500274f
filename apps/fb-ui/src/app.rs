use std::sync::Arc;

use fb_app::DashboardConfig;
use fb_controls::Evaluator;

use crate::run_worker::RunWorker;
use crate::state::DashboardState;
use crate::views::{ControlsView, PlotView};

pub struct FeedbackApp {
    state: DashboardState,
    worker: RunWorker,
    controls_view: ControlsView,
    plot_view: PlotView,
}

impl FeedbackApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: DashboardConfig,
        evaluator: Arc<dyn Evaluator>,
    ) -> Self {
        let ctx = cc.egui_ctx.clone();
        let worker = RunWorker::start(evaluator, move || ctx.request_repaint());

        let mut app = Self {
            state: DashboardState::new(config),
            worker,
            controls_view: ControlsView,
            plot_view: PlotView,
        };
        app.submit();
        app
    }

    fn submit(&mut self) {
        let (generation, request) = self.state.next_request();
        self.worker.submit(generation, request);
    }

    fn poll_worker(&mut self) {
        while let Ok(msg) = self.worker.result_rx.try_recv() {
            let generation = msg.generation();
            if !self.state.accept(msg) {
                tracing::debug!(generation, "dropping stale result");
            }
        }
    }

    fn show_header(&self, ui: &mut egui::Ui) {
        for line in self.state.config.description.lines() {
            let line = line.trim();
            if let Some(heading) = line.strip_prefix('#') {
                ui.heading(heading.trim_start_matches('#').trim());
            } else if !line.is_empty() {
                ui.label(line);
            }
        }
    }
}

impl eframe::App for FeedbackApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_worker();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            self.show_header(ui);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.state.is_pending() {
                    ui.spinner();
                    ui.label("Evaluating...");
                } else {
                    ui.label(format!(
                        "Evaluated in {:.1} ms",
                        self.state.last_eval_s() * 1000.0
                    ));
                }
                if let Some(err) = self.state.last_error() {
                    ui.separator();
                    ui.colored_label(egui::Color32::RED, err);
                }
            });
        });

        let changed = egui::SidePanel::right("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.controls_view.show(ui, &mut self.state))
            .inner;
        if changed {
            self.submit();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.plot_view
                .show(ui, &self.state.config.chart, self.state.result());
        });
    }
}
