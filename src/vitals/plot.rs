use std::io::Cursor;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use plotters::prelude::LineSeries;
use plotters::prelude::*;
use crate::types::VitalChannel;
use crate::vitals::error::PlotError;
use crate::vitals::profile::ChannelProfile;
/// Side length of the square view box used by `view_box_points`.
pub const VIEW_BOX: f64 = 100.0;
/// Renderable trace of one channel.
#[derive(Clone, Debug)]
pub struct ChartSeries {
    pub channel: VitalChannel,
    pub values: Vec<f64>, // oldest -> newest
    pub domain: (f64, f64),
    pub clamped: bool,
}
impl ChartSeries {
    pub fn new(channel: VitalChannel, values: Vec<f64>, profile: &ChannelProfile) -> Self {
        Self {
            channel,
            values,
            domain: profile.domain(),
            clamped: profile.clamp_to_domain,
        }
    }
    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied()
    }
    /// Maps the trace into a 100x100 box, y pointing down. Empty when there
    /// are fewer than two samples or the domain has no height.
    pub fn view_box_points(&self) -> Vec<(f64, f64)> {
        let (min, max) = self.domain;
        let range = max - min;
        if self.values.len() < 2 || range <= 0.0 {
            return Vec::new();
        }
        let step = VIEW_BOX / (self.values.len() - 1) as f64;
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64 * step, VIEW_BOX - (v - min) / range * VIEW_BOX))
            .collect()
    }
    /// `[index, value]` pairs for plot widgets.
    pub fn plot_points(&self) -> Vec<[f64; 2]> {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| [i as f64, *v])
            .collect()
    }
    /// Y range to draw: the profile domain, widened to fit unclamped excursions.
    pub fn y_range(&self) -> (f64, f64) {
        let (mut lo, mut hi) = self.domain;
        if !self.clamped {
            for &v in &self.values {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
        (lo, hi)
    }
}
#[derive(Clone, Debug)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub palette: Vec<RGBColor>,
    /// Captions and axis labels need a system font; off for headless export.
    pub show_labels: bool,
}
impl PlotStyle {
    /// Palette entry for the `idx`-th trace, cycling; white when the palette is empty.
    pub fn color_for(&self, idx: usize) -> RGBColor {
        match self.palette.len() {
            0 => WHITE,
            n => self.palette[idx % n],
        }
    }
}
impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 900,
            height: 600,
            background: RGBColor(10, 10, 10),
            palette: vec![GREEN, RED, CYAN, YELLOW],
            show_labels: true,
        }
    }
}
/// Draws the channels as a 2x2 grid of line charts and returns PNG bytes.
pub fn render_monitor_png(series: &[ChartSeries], style: &PlotStyle) -> Result<Vec<u8>, PlotError> {
    if series.is_empty() {
        return Err(PlotError::NoSeries);
    }
    let mut buffer = vec![0u8; (style.width * style.height * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (style.width, style.height))
            .into_drawing_area();
        root.fill(&style.background)?;
        let panels = root.split_evenly((2, 2));
        for (idx, (trace, panel)) in series.iter().zip(panels.iter()).enumerate() {
            let color = style.color_for(idx);
            let (y_min, y_max) = trace.y_range();
            let x_max = trace.values.len().max(2) as f64 - 1.0;
            let mut builder = ChartBuilder::on(panel);
            builder.margin(10);
            if style.show_labels {
                builder
                    .caption(
                        format!("{} ({})", trace.channel.title(), trace.channel.unit()),
                        ("sans-serif", 18).into_font().color(&WHITE),
                    )
                    .set_label_area_size(LabelAreaPosition::Left, 45)
                    .set_label_area_size(LabelAreaPosition::Bottom, 25);
            }
            let mut chart = builder.build_cartesian_2d(0f64..x_max, y_min..y_max)?;
            if style.show_labels {
                chart
                    .configure_mesh()
                    .light_line_style(&WHITE.mix(0.1))
                    .draw()?;
            }
            let points = trace.values.iter().enumerate().map(|(i, v)| (i as f64, *v));
            chart.draw_series(LineSeries::new(points, &color))?;
        }
        root.present()?;
    }
    encode_png(&buffer, style.width, style.height)
}
fn encode_png(buffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, PlotError> {
    let image = ImageBuffer::<Rgb<u8>, _>::from_raw(width, height, buffer.to_vec())
        .ok_or_else(|| PlotError::Render("failed to allocate image buffer".into()))?;
    let mut output = Vec::new();
    let dynamic = DynamicImage::ImageRgb8(image);
    dynamic.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::vitals::profile::ProfileSet;
    fn series(values: Vec<f64>) -> ChartSeries {
        ChartSeries::new(VitalChannel::HeartRate, values, &ProfileSet::STABLE_ADULT.hr)
    }
    #[test]
    fn view_box_maps_domain_edges() {
        let points = series(vec![50.0, 75.0, 100.0]).view_box_points();
        assert_eq!(points, vec![(0.0, 100.0), (50.0, 50.0), (100.0, 0.0)]);
    }
    #[test]
    fn view_box_needs_two_samples() {
        assert!(series(vec![75.0]).view_box_points().is_empty());
        let mut flat = series(vec![1.0, 2.0]);
        flat.domain = (5.0, 5.0);
        assert!(flat.view_box_points().is_empty());
    }
    #[test]
    fn unclamped_range_widens_to_fit() {
        let s = series(vec![45.0, 75.0, 120.0]);
        assert_eq!(s.y_range(), (45.0, 120.0));
        let mut clamped = s.clone();
        clamped.clamped = true;
        assert_eq!(clamped.y_range(), (50.0, 100.0));
        assert_eq!(s.latest(), Some(120.0));
        assert_eq!(s.plot_points()[2], [2.0, 120.0]);
    }
    #[test]
    fn renders_png_without_fonts() {
        let profiles = ProfileSet::STABLE_ADULT;
        let traces: Vec<ChartSeries> = VitalChannel::ALL
            .iter()
            .map(|&ch| {
                let p = profiles.channel(ch);
                ChartSeries::new(ch, vec![p.baseline; 30], p)
            })
            .collect();
        let style = PlotStyle {
            width: 200,
            height: 120,
            show_labels: false,
            ..PlotStyle::default()
        };
        let png = render_monitor_png(&traces, &style).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        assert!(matches!(render_monitor_png(&[], &style), Err(PlotError::NoSeries)));
    }
    #[test]
    fn empty_palette_draws_in_white() {
        let style = PlotStyle {
            width: 120,
            height: 80,
            palette: Vec::new(),
            show_labels: false,
            ..PlotStyle::default()
        };
        assert_eq!(style.color_for(3), WHITE);
        assert_eq!(PlotStyle::default().color_for(5), RED);
        let traces = vec![series(vec![60.0, 80.0, 70.0])];
        let png = render_monitor_png(&traces, &style).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
}
