// src/gui.rs
use std::fs;
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

use eframe::egui;
use egui::{Color32, RichText};
use egui_plot::{Line, Plot, PlotPoints};
use log::warn;

use vitalsim::records::{Patient, PatientRepository};
use vitalsim::vitals::{render_monitor_png, ChartSeries, PlotStyle};
use vitalsim::{MonitorEvent, VitalChannel, VitalsMonitor};

const DOCTOR_ID: &str = "doc-001";
const REPAINT_EVERY: Duration = Duration::from_millis(50);

fn channel_color(channel: VitalChannel) -> Color32 {
    match channel {
        VitalChannel::HeartRate => Color32::from_rgb(80, 220, 100),
        VitalChannel::BloodPressure => Color32::from_rgb(230, 80, 80),
        VitalChannel::SpO2 => Color32::from_rgb(0, 200, 230),
        VitalChannel::Respiration => Color32::from_rgb(240, 200, 60),
    }
}

pub struct MonitorApp {
    // 病人名册
    store: Box<dyn PatientRepository>,
    patients: Vec<Patient>,
    selected: Option<String>,
    condition_input: String,

    // 监护仪
    monitor: VitalsMonitor,
    rx: Receiver<MonitorEvent>,
    summary: String,

    // 界面日志
    export_path: String,
    log_messages: Vec<String>,
}

impl MonitorApp {
    pub fn new(
        store: Box<dyn PatientRepository>,
        config: vitalsim::MonitorConfig,
    ) -> anyhow::Result<Self> {
        let (tx, rx) = channel();
        let patients = store.list();
        let active = store
            .active_for(DOCTOR_ID)
            .or_else(|| patients.first().cloned());
        let condition = active
            .as_ref()
            .map(|p| p.primary_condition.clone())
            .unwrap_or_default();
        // 启动监护仪 (每个通道一个定时线程)
        let monitor = VitalsMonitor::start(&condition, config, Some(tx))?;
        let summary = monitor.summary();
        Ok(Self {
            store,
            patients,
            selected: active.map(|p| p.id),
            condition_input: condition,
            monitor,
            rx,
            summary,
            export_path: "vitals.png".to_owned(),
            log_messages: vec!["Vitals monitor ready.".to_owned()],
        })
    }

    fn log(&mut self, msg: &str) {
        self.log_messages.push(format!("> {}", msg));
        if self.log_messages.len() > 8 {
            self.log_messages.remove(0);
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            // 旧一代的消息直接丢弃
            if event.generation() != self.monitor.generation() {
                continue;
            }
            match event {
                MonitorEvent::Vitals { summary, .. } => self.summary = summary,
                MonitorEvent::Started {
                    condition,
                    profile_name,
                    ..
                } => self.log(&format!("Monitoring {condition:?} as {profile_name}")),
                // 切换时 generation 已经递增，只会收到旧一代的 Stopped
                MonitorEvent::Stopped { .. } => {}
            }
        }
    }

    fn select_patient(&mut self, patient: Patient) {
        if let Err(err) = self.store.set_active(DOCTOR_ID, Some(&patient.id)) {
            warn!("could not persist active patient: {err}");
            self.log(&format!("Save failed: {err}"));
        }
        self.condition_input = patient.primary_condition.clone();
        self.selected = Some(patient.id);
        self.apply_condition();
    }

    fn apply_condition(&mut self) {
        let condition = self.condition_input.clone();
        let previous = self.monitor.generation();
        self.monitor.switch_condition(&condition);
        self.summary = self.monitor.summary();
        self.log(&format!(
            "Generation {previous} stopped, now gen {}",
            self.monitor.generation()
        ));
    }

    fn export_png(&mut self) {
        let series = self.monitor.chart_series();
        let result = render_monitor_png(&series, &PlotStyle::default())
            .map_err(anyhow::Error::from)
            .and_then(|png| fs::write(&self.export_path, png).map_err(anyhow::Error::from));
        match result {
            Ok(()) => self.log(&format!("Saved {}", self.export_path)),
            Err(err) => {
                warn!("png export failed: {err:#}");
                self.log(&format!("Export failed: {err}"));
            }
        }
    }

    fn draw_patient_list(&mut self, ui: &mut egui::Ui) {
        ui.heading("Patients");
        ui.separator();
        let mut clicked = None;
        for patient in &self.patients {
            let is_selected = self.selected.as_deref() == Some(patient.id.as_str());
            let label = format!("{} ({}, {})", patient.name, patient.age, patient.gender);
            if ui.selectable_label(is_selected, label).clicked() && !is_selected {
                clicked = Some(patient.clone());
            }
            ui.label(RichText::new(&patient.primary_condition).small().weak());
            ui.add_space(4.0);
        }
        if let Some(patient) = clicked {
            self.select_patient(patient);
        }
    }

    fn draw_chart(ui: &mut egui::Ui, series: &ChartSeries, width: f32) {
        let color = channel_color(series.channel);
        let current = series.latest().unwrap_or(series.domain.0);
        ui.vertical(|ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(series.channel.title()).strong());
                ui.label(
                    RichText::new(format!("{current:.0}"))
                        .size(22.0)
                        .color(color)
                        .strong(),
                );
                ui.label(RichText::new(series.channel.unit()).weak());
            });
            let (y_min, y_max) = series.y_range();
            Plot::new(series.channel.key())
                .width(width)
                .height(140.0)
                .allow_drag(false)
                .allow_zoom(false)
                .show_x(false)
                .include_y(y_min)
                .include_y(y_max)
                .show(ui, |plot_ui| {
                    plot_ui.line(Line::new(PlotPoints::from(series.plot_points())).color(color));
                });
        });
    }
}

impl eframe::App for MonitorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        egui::SidePanel::left("patients")
            .min_width(220.0)
            .show(ctx, |ui| self.draw_patient_list(ui));

        egui::TopBottomPanel::top("condition").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Primary condition:");
                let edit = ui.text_edit_singleline(&mut self.condition_input);
                let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if ui.button("Apply").clicked() || submitted {
                    self.apply_condition();
                }
                ui.separator();
                ui.label(format!(
                    "Profile: {} (gen {})",
                    self.monitor.profile_name(),
                    self.monitor.generation()
                ));
            });
        });

        egui::TopBottomPanel::bottom("summary").show(ctx, |ui| {
            ui.label(RichText::new(&self.summary).monospace());
            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut self.export_path);
                if ui.button("Export PNG").clicked() {
                    self.export_png();
                }
            });
            for msg in &self.log_messages {
                ui.label(RichText::new(msg).small().weak());
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Vitals Monitor");
            let series = self.monitor.chart_series();
            let width = (ui.available_width() / 2.0 - 16.0).max(200.0);
            egui::Grid::new("charts")
                .num_columns(2)
                .spacing([16.0, 16.0])
                .show(ui, |ui| {
                    for (idx, s) in series.iter().enumerate() {
                        Self::draw_chart(ui, s, width);
                        if idx % 2 == 1 {
                            ui.end_row();
                        }
                    }
                });
        });

        ctx.request_repaint_after(REPAINT_EVERY);
    }
}
