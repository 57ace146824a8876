//! Team priorities stored as xml:
//!
//! ```xml
//! <Instance>
//!   <Teams>
//!     <Team id="1" priority="2;3;4" />
//!     ...
//!   </Teams>
//! </Instance>
//! ```

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;

use log::*;

use crate::error::InstanceError;
use crate::priority::TeamPriority;
use crate::TeamId;

fn parse_team_id(s: &str) -> Result<TeamId, InstanceError> {
    s.trim()
        .parse::<TeamId>()
        .map_err(|_| InstanceError::InvalidTeamId(s.to_string()))
}

pub fn parse_instance(xml: &str) -> Result<TeamPriority, InstanceError> {
    let doc = roxmltree::Document::parse(xml)?;
    let root = doc.root_element();
    if root.tag_name().name() != "Instance" {
        return Err(InstanceError::MissingElement("Instance"));
    }
    let teams = root
        .children()
        .find(|n| n.tag_name().name() == "Teams")
        .ok_or(InstanceError::MissingElement("Teams"))?;

    let mut priorities = BTreeMap::new();
    for team in teams.children().filter(|n| n.tag_name().name() == "Team") {
        let id = team.attribute("id").ok_or(InstanceError::MissingAttribute {
            element: "Team",
            attribute: "id",
        })?;
        let id = parse_team_id(id)?;
        let priority = team.attribute("priority").ok_or(InstanceError::MissingAttribute {
            element: "Team",
            attribute: "priority",
        })?;
        let opponents = priority
            .split(';')
            .filter(|s| !s.trim().is_empty())
            .map(parse_team_id)
            .collect::<Result<Vec<_>, _>>()?;
        if priorities.insert(id, opponents).is_some() {
            return Err(InstanceError::DuplicateTeam(id));
        }
    }

    debug!("Parsed {} teams", priorities.len());
    Ok(TeamPriority::new(priorities)?)
}

pub fn load_instance(path: &Path) -> Result<TeamPriority, InstanceError> {
    info!("Loading xml {:?}", path);
    let xml = std::fs::read_to_string(path)?;
    info!("Loaded {} chars", xml.len());
    parse_instance(&xml)
}

pub fn format_instance_xml(team_priority: &TeamPriority) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(&mut out, "<Instance>")?;
    writeln!(&mut out, "  <Teams>")?;
    for (team, seq) in team_priority.iter() {
        let priority = seq.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(";");
        writeln!(&mut out, "    <Team id=\"{}\" priority=\"{}\" />", team, priority)?;
    }
    writeln!(&mut out, "  </Teams>")?;
    writeln!(&mut out, "</Instance>")?;
    Ok(out)
}
