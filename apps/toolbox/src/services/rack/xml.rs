use std::io::Cursor;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use super::model::{check_height, new_id, Component, ComponentKind, Rack, RackProject};
use super::RackError;

fn xml_error(err: impl std::fmt::Display) -> RackError {
    RackError::Xml(err.to_string())
}

/// `<RackPlanner><Rack id name height><Component .../></Rack></RackPlanner>`
pub fn to_xml(project: &RackProject) -> Result<String, RackError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_error)?;
    writer
        .write_event(Event::Start(BytesStart::new("RackPlanner")))
        .map_err(xml_error)?;

    for rack in &project.racks {
        let height = rack.height.to_string();
        let mut start = BytesStart::new("Rack");
        start.push_attribute(("id", rack.id.as_str()));
        start.push_attribute(("name", rack.name.as_str()));
        start.push_attribute(("height", height.as_str()));
        writer.write_event(Event::Start(start)).map_err(xml_error)?;

        for component in rack.components_top_down() {
            let position = component.position.to_string();
            let size = component.size.to_string();
            let mut element = BytesStart::new("Component");
            element.push_attribute(("id", component.id.as_str()));
            element.push_attribute(("type", component.kind.value()));
            element.push_attribute(("name", component.name.as_str()));
            element.push_attribute(("model", component.model.as_str()));
            element.push_attribute(("position", position.as_str()));
            element.push_attribute(("size", size.as_str()));
            element.push_attribute(("notes", component.notes.as_str()));
            writer.write_event(Event::Empty(element)).map_err(xml_error)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("Rack")))
            .map_err(xml_error)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new("RackPlanner")))
        .map_err(xml_error)?;
    String::from_utf8(writer.into_inner().into_inner()).map_err(xml_error)
}

fn attributes(element: &BytesStart) -> Result<Vec<(String, String)>, RackError> {
    element
        .attributes()
        .map(|attribute| {
            let attribute = attribute.map_err(xml_error)?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute.unescape_value().map_err(xml_error)?.into_owned();
            Ok((key, value))
        })
        .collect()
}

fn lookup<'a>(attributes: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
}

fn number(attributes: &[(String, String)], key: &str, element: &str) -> Result<u32, RackError> {
    let raw = lookup(attributes, key)
        .ok_or_else(|| RackError::Xml(format!("<{element}> is missing `{key}`")))?;
    raw.trim()
        .parse()
        .map_err(|_| RackError::Xml(format!("<{element}> has non-numeric {key} `{raw}`")))
}

fn id_or_new(attributes: &[(String, String)]) -> String {
    lookup(attributes, "id")
        .filter(|id| !id.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(new_id)
}

fn parse_rack(element: &BytesStart) -> Result<Rack, RackError> {
    let attributes = attributes(element)?;
    let height = number(&attributes, "height", "Rack")?;
    check_height(height)?;
    Ok(Rack {
        id: id_or_new(&attributes),
        name: lookup(&attributes, "name").unwrap_or("Rack").to_string(),
        height,
        components: Vec::new(),
    })
}

fn parse_component(element: &BytesStart) -> Result<Component, RackError> {
    let attributes = attributes(element)?;
    let kind = lookup(&attributes, "type")
        .map(|value| ComponentKind::from_value(value).unwrap_or(ComponentKind::Other))
        .unwrap_or_default();
    let text = |key: &str| lookup(&attributes, key).unwrap_or_default().to_string();
    Ok(Component {
        id: id_or_new(&attributes),
        kind,
        name: text("name"),
        model: text("model"),
        position: number(&attributes, "position", "Component")?,
        size: number(&attributes, "size", "Component")?,
        notes: text("notes"),
    })
}

fn place(rack: &mut Rack, component: Component) -> Result<(), RackError> {
    rack.check_placement(component.position, component.size, None)?;
    rack.components.push(component);
    Ok(())
}

/// Rebuilds a project, re-checking every placement so overlapping or
/// out-of-bounds components in hand-edited files are rejected.
pub fn from_xml(xml: &str) -> Result<RackProject, RackError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut project = RackProject::default();
    let mut current: Option<Rack> = None;
    let mut seen_root = false;

    loop {
        match reader.read_event().map_err(xml_error)? {
            Event::Start(element) => match element.name().as_ref() {
                b"RackPlanner" => seen_root = true,
                b"Rack" => current = Some(parse_rack(&element)?),
                b"Component" => {
                    let rack = current
                        .as_mut()
                        .ok_or_else(|| RackError::Xml("<Component> outside <Rack>".into()))?;
                    place(rack, parse_component(&element)?)?;
                }
                _ => {}
            },
            Event::Empty(element) => match element.name().as_ref() {
                b"RackPlanner" => seen_root = true,
                b"Rack" => project.racks.push(parse_rack(&element)?),
                b"Component" => {
                    let rack = current
                        .as_mut()
                        .ok_or_else(|| RackError::Xml("<Component> outside <Rack>".into()))?;
                    place(rack, parse_component(&element)?)?;
                }
                _ => {}
            },
            Event::End(element) if element.name().as_ref() == b"Rack" => {
                if let Some(rack) = current.take() {
                    project.racks.push(rack);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(RackError::Xml("missing <RackPlanner> root".into()));
    }
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::rack::ComponentDraft;

    fn sample() -> RackProject {
        let mut project = RackProject::default();
        let a = project.add_rack("Core & Edge", 42).unwrap();
        project
            .add_component(&a, ComponentDraft::new(ComponentKind::Switch, "sw <1>"), None)
            .unwrap();
        let id = project
            .add_component(
                &a,
                ComponentDraft::new(ComponentKind::Storage, "san").with_size(4),
                Some(10),
            )
            .unwrap();
        project
            .update_component(&a, &id, "san", "ME5024", "dual \"controllers\"")
            .unwrap();
        project.add_rack("Empty", 12).unwrap();
        project
    }

    #[test]
    fn export_then_import_preserves_project() {
        let project = sample();
        let xml = to_xml(&project).unwrap();
        assert!(xml.contains("<RackPlanner>"));
        assert!(xml.contains("type=\"storage\""));

        let restored = from_xml(&xml).unwrap();
        assert_eq!(restored.racks.len(), 2);
        for (original, restored) in project.racks.iter().zip(&restored.racks) {
            assert_eq!(original.id, restored.id);
            assert_eq!(original.name, restored.name);
            assert_eq!(original.height, restored.height);
            let mut expected = original.components.clone();
            let mut actual = restored.components.clone();
            expected.sort_by(|a, b| a.id.cmp(&b.id));
            actual.sort_by(|a, b| a.id.cmp(&b.id));
            assert_eq!(expected, actual);
        }
    }

    #[test]
    fn overlapping_components_are_rejected_on_import() {
        let xml = r#"<RackPlanner>
            <Rack id="r" name="R" height="10">
                <Component id="a" type="server" name="a" position="2" size="2"/>
                <Component id="b" type="server" name="b" position="3" size="1"/>
            </Rack>
        </RackPlanner>"#;
        assert!(matches!(from_xml(xml), Err(RackError::Collision { .. })));
    }

    #[test]
    fn malformed_documents_are_reported() {
        assert!(matches!(from_xml("<Other/>"), Err(RackError::Xml(_))));
        assert!(matches!(
            from_xml(r#"<RackPlanner><Rack name="x"/></RackPlanner>"#),
            Err(RackError::Xml(_))
        ));
        assert!(matches!(
            from_xml(r#"<RackPlanner><Rack height="0"/></RackPlanner>"#),
            Err(RackError::InvalidHeight(0))
        ));
    }

    #[test]
    fn oversized_positions_are_out_of_bounds() {
        let xml = r#"<RackPlanner><Rack id="r" name="R" height="42">
            <Component id="a" type="server" name="a" position="4294967295" size="2"/>
        </Rack></RackPlanner>"#;
        assert!(matches!(
            from_xml(xml),
            Err(RackError::OutOfBounds { position: 4294967295, size: 2, height: 42 })
        ));

        let xml = r#"<RackPlanner><Rack id="r" name="R" height="42">
            <Component id="a" type="server" name="a" position="1" size="4294967295"/>
        </Rack></RackPlanner>"#;
        assert!(matches!(from_xml(xml), Err(RackError::OutOfBounds { .. })));
    }

    #[test]
    fn missing_ids_and_unknown_types_are_tolerated() {
        let xml = r#"<RackPlanner><Rack name="R" height="4">
            <Component type="toaster" name="t" position="1" size="1"/>
        </Rack></RackPlanner>"#;
        let project = from_xml(xml).unwrap();
        let component = &project.racks[0].components[0];
        assert_eq!(component.kind, ComponentKind::Other);
        assert!(!component.id.is_empty());
    }
}
