use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::output::{write_artifact, OutputError};
use crate::temples::TempleRecord;

use super::{Alliance, MapData, Player, TownRow};

/// Groups towns under their player and that player's alliance.
///
/// Towns of unknown players are skipped. An alliance id that is referenced but
/// absent from the dump gets a placeholder. Alliances come out by ascending id,
/// players in dump order.
pub fn assemble(
    mut players: Vec<Player>,
    alliances: Vec<Alliance>,
    towns: Vec<TownRow>,
    temples: Vec<TempleRecord>,
) -> MapData {
    let player_slot: HashMap<i64, usize> = players
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id, i))
        .collect();
    let mut alliances_by_id: BTreeMap<i64, Alliance> =
        alliances.into_iter().map(|a| (a.id, a)).collect();

    let mut orphans = 0usize;
    for TownRow { player_id, town } in towns {
        let Some(&slot) = player_slot.get(&player_id) else {
            orphans += 1;
            continue;
        };
        let player = &mut players[slot];
        player.towns.push(town);
        alliances_by_id
            .entry(player.alliance_id)
            .or_insert_with(|| Alliance::placeholder(player.alliance_id))
            .towns
            .push(town);
    }
    if orphans > 0 {
        tracing::debug!(orphans, "skipped towns without a known player");
    }

    MapData {
        alliances: alliances_by_id.into_values().collect(),
        players,
        temples,
    }
}

/// `// generated on <timestamp>` followed by `const mapData = <json>;`.
pub fn render_map_data(
    data: &MapData,
    generated_at: DateTime<Utc>,
) -> Result<String, serde_json::Error> {
    let body = serde_json::to_string_pretty(data)?;
    Ok(format!(
        "// generated on {}\nconst mapData = {body};\n",
        generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    ))
}

pub fn write_map_data(path: &Path, data: &MapData) -> Result<(), OutputError> {
    let contents = render_map_data(data, Utc::now())?;
    write_artifact(path, &contents)
}
