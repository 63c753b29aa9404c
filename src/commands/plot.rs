//! # plot 命令实现
//!
//! 把常数文件中的 C11、C12、C44 随温度的变化画成折线图（PNG 或 SVG，
//! 由输出文件扩展名决定）。无定义的点不画。
//!
//! ## 依赖关系
//! - 使用 `cli/results.rs` 定义的参数
//! - 使用 `parsers/results.rs` 读取常数
//! - 使用 `plotters` 渲染图表

use crate::cli::results::PlotArgs;
use crate::error::{ElasticError, Result};
use crate::parsers::{self, ConstantsRow};
use crate::utils::output;

use plotters::prelude::*;
use std::ops::Range;

/// 一条常数曲线
#[derive(Debug, Clone)]
struct Series {
    name: &'static str,
    color: RGBColor,
    points: Vec<(f64, f64)>,
}

/// 执行 plot 命令
pub fn execute(args: PlotArgs) -> Result<()> {
    output::print_header("Plotting Elastic Constants");

    let rows = parsers::read_constants(&args.input)?;
    let series = build_series(&rows);
    let (x_range, y_range) = axis_ranges(&series)
        .ok_or_else(|| ElasticError::Other("No defined constants to plot".to_string()))?;

    let use_svg = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));

    let size = (args.width, args.height);
    if use_svg {
        let root = SVGBackend::new(&args.output, size).into_drawing_area();
        draw_chart(&root, &series, &args.title, x_range, y_range)?;
        root.present()
            .map_err(|e| ElasticError::Other(e.to_string()))?;
    } else {
        let root = BitMapBackend::new(&args.output, size).into_drawing_area();
        draw_chart(&root, &series, &args.title, x_range, y_range)?;
        root.present()
            .map_err(|e| ElasticError::Other(e.to_string()))?;
    }

    output::print_success(&format!(
        "Plot of {} temperatures saved to '{}'",
        rows.len(),
        args.output.display()
    ));
    Ok(())
}

fn build_series(rows: &[ConstantsRow]) -> Vec<Series> {
    let pick = |f: fn(&ConstantsRow) -> Option<f64>| -> Vec<(f64, f64)> {
        rows.iter()
            .filter_map(|r| f(r).map(|c| (r.temperature, c)))
            .filter(|(t, c)| t.is_finite() && c.is_finite())
            .collect()
    };
    vec![
        Series {
            name: "C11",
            color: RGBColor(204, 0, 0),
            points: pick(|r| r.constants.c11),
        },
        Series {
            name: "C12",
            color: RGBColor(0, 102, 204),
            points: pick(|r| r.constants.c12),
        },
        Series {
            name: "C44",
            color: RGBColor(0, 153, 51),
            points: pick(|r| r.constants.c44),
        },
    ]
}

/// 带 10% 边距的坐标范围；没有任何有效点时为 `None`
fn axis_ranges(series: &[Series]) -> Option<(Range<f64>, Range<f64>)> {
    let points = || series.iter().flat_map(|s| s.points.iter());
    let first = points().next()?;

    let (mut x_min, mut x_max, mut y_min, mut y_max) = (first.0, first.0, first.1, first.1);
    for (x, y) in points() {
        x_min = x_min.min(*x);
        x_max = x_max.max(*x);
        y_min = y_min.min(*y);
        y_max = y_max.max(*y);
    }

    let pad = |lo: f64, hi: f64| {
        let margin = if hi > lo { (hi - lo) * 0.1 } else { lo.abs().max(1.0) * 0.1 };
        (lo - margin)..(hi + margin)
    };
    Some((pad(x_min, x_max), pad(y_min, y_max)))
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    series: &[Series],
    title: &str,
    x_range: Range<f64>,
    y_range: Range<f64>,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)
        .map_err(|e| ElasticError::Other(format!("{:?}", e)))?;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)
        .map_err(|e| ElasticError::Other(format!("{:?}", e)))?;

    chart
        .configure_mesh()
        .x_desc("Temperature (K)")
        .y_desc("Elastic constant (GPa)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(|e| ElasticError::Other(format!("{:?}", e)))?;

    for s in series.iter().filter(|s| !s.points.is_empty()) {
        let color = s.color;
        chart
            .draw_series(LineSeries::new(s.points.iter().copied(), color.stroke_width(2)))
            .map_err(|e| ElasticError::Other(format!("{:?}", e)))?
            .label(s.name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));

        chart
            .draw_series(s.points.iter().map(|&(x, y)| Circle::new((x, y), 4, color.filled())))
            .map_err(|e| ElasticError::Other(format!("{:?}", e)))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| ElasticError::Other(format!("{:?}", e)))?;

    Ok(())
}
