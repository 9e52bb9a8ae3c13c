use std::fmt::Write as _;

use image::{DynamicImage, Rgba, RgbaImage};
use quick_xml::escape::escape;

use super::model::{Rack, RackProject};
use super::RackError;
use crate::services::image_convert::{self, OutputFormat};

const CSV_HEADER: [&str; 8] = [
    "Rack", "Component", "Type", "Model", "Position", "Size", "Top", "Notes",
];

pub fn to_csv(project: &RackProject) -> Result<String, RackError> {
    let csv_error = |err: csv::Error| RackError::Csv(err.to_string());
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(csv_error)?;
    for rack in &project.racks {
        for component in rack.components_top_down() {
            let position = component.position.to_string();
            let size = component.size.to_string();
            let top = component.top().to_string();
            writer
                .write_record([
                    rack.name.as_str(),
                    component.name.as_str(),
                    component.kind.label(),
                    component.model.as_str(),
                    position.as_str(),
                    size.as_str(),
                    top.as_str(),
                    component.notes.as_str(),
                ])
                .map_err(csv_error)?;
        }
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| RackError::Csv(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| RackError::Csv(err.to_string()))
}

/// HTML table that spreadsheet applications open as a workbook.
pub fn to_excel_html(project: &RackProject) -> String {
    let mut html = String::from(
        "<html xmlns:o=\"urn:schemas-microsoft-com:office:office\" \
         xmlns:x=\"urn:schemas-microsoft-com:office:excel\">\n\
         <head><meta charset=\"utf-8\"></head>\n<body>\n<table border=\"1\">\n<tr>",
    );
    for heading in CSV_HEADER {
        let _ = write!(html, "<th>{heading}</th>");
    }
    html.push_str("</tr>\n");
    for rack in &project.racks {
        for component in rack.components_top_down() {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&rack.name),
                escape(&component.name),
                component.kind.label(),
                escape(&component.model),
                component.position,
                component.size,
                component.top(),
                escape(&component.notes),
            );
        }
    }
    html.push_str("</table>\n</body>\n</html>\n");
    html
}

fn elevation_rows(rack: &Rack, html: &mut String) {
    let mut unit = rack.height;
    while unit >= 1 {
        match rack.component_at(unit) {
            Some(component) if component.top() == unit => {
                let _ = writeln!(
                    html,
                    "<tr><td class=\"u\">{unit}</td><td class=\"slot\" rowspan=\"{size}\" \
                     style=\"background:{color}\"><strong>{name}</strong> {model}</td></tr>",
                    size = component.size,
                    color = component.kind.css_color(),
                    name = escape(&component.name),
                    model = escape(&component.model),
                );
            }
            Some(_) => {
                let _ = writeln!(html, "<tr><td class=\"u\">{unit}</td></tr>");
            }
            None => {
                let _ = writeln!(
                    html,
                    "<tr><td class=\"u\">{unit}</td><td class=\"slot empty\"></td></tr>"
                );
            }
        }
        unit -= 1;
    }
}

/// Standalone document with one elevation table and parts list per rack.
pub fn to_printable_html(project: &RackProject) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Rack plan</title>\n\
         <style>\n\
         body { font-family: sans-serif; }\n\
         .rack { page-break-after: always; }\n\
         table.elevation { border-collapse: collapse; width: 420px; }\n\
         table.elevation td { border: 1px solid #94a3b8; height: 18px; font-size: 11px; }\n\
         td.u { width: 32px; text-align: right; padding-right: 4px; color: #64748b; }\n\
         td.slot { padding-left: 6px; color: #fff; }\n\
         td.empty { background: #f8fafc; }\n\
         </style>\n</head>\n<body>\n",
    );
    for rack in &project.racks {
        let usage = rack.utilization();
        let _ = writeln!(
            html,
            "<section class=\"rack\">\n<h1>{}</h1>\n<p>{}U rack, {} of {}U used ({:.0}%)</p>",
            escape(&rack.name),
            rack.height,
            usage.used,
            usage.total,
            usage.percent(),
        );
        html.push_str("<table class=\"elevation\">\n");
        elevation_rows(rack, &mut html);
        html.push_str("</table>\n<ul>\n");
        for component in rack.components_top_down() {
            let _ = writeln!(
                html,
                "<li>U{}-{}: {} ({}) {}</li>",
                component.position,
                component.top(),
                escape(&component.name),
                component.kind.label(),
                escape(&component.notes),
            );
        }
        html.push_str("</ul>\n</section>\n");
    }
    html.push_str("</body>\n</html>\n");
    html
}

const UNIT_PX: u32 = 14;
const RACK_WIDTH_PX: u32 = 160;
const RAIL_PX: u32 = 10;
const MARGIN_PX: u32 = 20;

fn fill(image: &mut RgbaImage, x: u32, y: u32, width: u32, height: u32, color: Rgba<u8>) {
    let x_end = (x + width).min(image.width());
    let y_end = (y + height).min(image.height());
    for py in y..y_end {
        for px in x..x_end {
            image.put_pixel(px, py, color);
        }
    }
}

/// Front elevation of every rack side by side. Colours encode the
/// component type; no text is drawn.
pub fn to_png(project: &RackProject) -> Result<Vec<u8>, RackError> {
    let tallest = project.racks.iter().map(|rack| rack.height).max().unwrap_or(1);
    let columns = project.racks.len().max(1) as u32;
    let width = MARGIN_PX + columns * (RACK_WIDTH_PX + 2 * RAIL_PX + MARGIN_PX);
    let height = 2 * MARGIN_PX + tallest * UNIT_PX;

    let mut image = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    let frame = Rgba([30, 41, 59, 255]);
    let slot = Rgba([241, 245, 249, 255]);
    let divider = Rgba([203, 213, 225, 255]);

    for (index, rack) in project.racks.iter().enumerate() {
        let left = MARGIN_PX + index as u32 * (RACK_WIDTH_PX + 2 * RAIL_PX + MARGIN_PX);
        let top = MARGIN_PX + (tallest - rack.height) * UNIT_PX;
        let inner = left + RAIL_PX;

        fill(&mut image, left, top, RACK_WIDTH_PX + 2 * RAIL_PX, rack.height * UNIT_PX, frame);
        fill(&mut image, inner, top, RACK_WIDTH_PX, rack.height * UNIT_PX, slot);
        for unit in 1..rack.height {
            fill(&mut image, inner, top + unit * UNIT_PX, RACK_WIDTH_PX, 1, divider);
        }

        for component in &rack.components {
            let [r, g, b] = component.kind.rgb();
            let y = top + (rack.height - component.top()) * UNIT_PX;
            fill(
                &mut image,
                inner + 1,
                y + 1,
                RACK_WIDTH_PX - 2,
                component.size * UNIT_PX - 2,
                Rgba([r, g, b, 255]),
            );
        }
    }

    Ok(image_convert::encode(
        &DynamicImage::ImageRgba8(image),
        OutputFormat::Png,
        100,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::rack::{ComponentDraft, ComponentKind};

    fn project() -> RackProject {
        let mut project = RackProject::default();
        let rack = project.add_rack("Lab, \"east\"", 6).unwrap();
        project
            .add_component(&rack, ComponentDraft::new(ComponentKind::Server, "web <1>"), None)
            .unwrap();
        project
            .add_component(
                &rack,
                ComponentDraft::new(ComponentKind::Ups, "ups"),
                Some(1),
            )
            .unwrap();
        project
    }

    #[test]
    fn csv_quotes_fields() {
        let csv = to_csv(&project()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Rack,Component,Type,Model,Position,Size,Top,Notes");
        assert_eq!(lines[1], "\"Lab, \"\"east\"\"\",web <1>,Server,,6,1,6,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn html_exports_escape_names() {
        let project = project();
        let excel = to_excel_html(&project);
        assert!(excel.contains("urn:schemas-microsoft-com:office:excel"));
        assert!(excel.contains("web &lt;1&gt;"));

        let printable = to_printable_html(&project);
        assert!(printable.contains("rowspan=\"2\""));
        assert!(printable.contains("3 of 6U used"));
        assert!(!printable.contains("<1>"));
    }

    #[test]
    fn png_has_one_column_per_rack() {
        let mut project = project();
        project.add_rack("Second", 12).unwrap();
        let png = to_png(&project).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(
            decoded.width(),
            MARGIN_PX + 2 * (RACK_WIDTH_PX + 2 * RAIL_PX + MARGIN_PX)
        );
        assert_eq!(decoded.height(), 2 * MARGIN_PX + 12 * UNIT_PX);
    }
}
