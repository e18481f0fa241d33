// src/main.rs
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
mod gui;
use anyhow::{anyhow, Context, Result};
use eframe::egui;
use vitalsim::records::JsonFilePatientStore;
use vitalsim::MonitorConfig;

const ROSTER_PATH: &str = "patients.json";

// 入口函数：可选的第一个参数是监护仪配置 (JSON)
fn main() -> Result<()> {
    env_logger::init();
    let config = match std::env::args().nth(1) {
        Some(path) => MonitorConfig::from_json_file(&path)
            .with_context(|| format!("loading monitor config {path}"))?,
        None => MonitorConfig::default(),
    };
    let store = JsonFilePatientStore::open(ROSTER_PATH)
        .with_context(|| format!("opening patient roster {ROSTER_PATH}"))?;
    let app = gui::MonitorApp::new(Box::new(store), config)?;
    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([1280.0, 820.0])
        .with_min_inner_size([960.0, 640.0])
        .with_title("VitalSim Monitor");
    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    eframe::run_native("VitalSim", options, Box::new(|_cc| Box::new(app)))
        .map_err(|err| anyhow!("monitor window failed: {err}"))
}
