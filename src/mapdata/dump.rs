//! Line parsers for the world dumps. Lines are comma separated, each field
//! percent-encoded, with `+` standing for a space in names.

use super::{Alliance, Player, Town};

/// A town line reduced to what the map draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TownRow {
    pub player_id: i64,
    pub town: Town,
}

/// Splits a dump line on `,` and percent-decodes every field.
/// `None` when a field does not decode to UTF-8.
pub fn split_fields(line: &str) -> Option<Vec<String>> {
    line.split(',')
        .map(|field| {
            urlencoding::decode(field)
                .map(|decoded| decoded.into_owned())
                .ok()
        })
        .collect()
}

fn clean_name(value: &str) -> String {
    value.replace('+', " ")
}

/// Blank counts as 0 (ghost towns, players without alliance); anything else must be an integer.
fn number(fields: &[String], index: usize) -> Option<i64> {
    let raw = fields.get(index).map(|f| f.trim()).unwrap_or("");
    if raw.is_empty() {
        Some(0)
    } else {
        raw.parse().ok()
    }
}

fn field(fields: &[String], index: usize) -> &str {
    fields.get(index).map(String::as_str).unwrap_or("")
}

/// `id,name,alliance_id,points,rank,towns`
pub fn parse_player(line: &str) -> Option<Player> {
    let fields = split_fields(line)?;
    Some(Player {
        id: number(&fields, 0)?,
        name: clean_name(field(&fields, 1)),
        alliance_id: number(&fields, 2)?,
        towns: Vec::new(),
    })
}

/// `id,name,points,towns,members,rank`
pub fn parse_alliance(line: &str) -> Option<Alliance> {
    let fields = split_fields(line)?;
    Some(Alliance {
        id: number(&fields, 0)?,
        name: clean_name(field(&fields, 1)),
        towns: Vec::new(),
    })
}

/// `id,player_id,name,island_x,island_y,number_on_island,points`
pub fn parse_town(line: &str) -> Option<TownRow> {
    let fields = split_fields(line)?;
    Some(TownRow {
        player_id: number(&fields, 1)?,
        town: Town {
            x: number(&fields, 3)?,
            y: number(&fields, 4)?,
            slot: number(&fields, 5)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_name_is_decoded_and_cleaned() {
        let p = parse_player("848,Le+Grand%20Ch%C3%A8vre,12,4521,3,7").unwrap();
        assert_eq!(p.id, 848);
        assert_eq!(p.name, "Le Grand Chèvre");
        assert_eq!(p.alliance_id, 12);
        assert!(p.towns.is_empty());
    }

    #[test]
    fn player_without_alliance_gets_zero() {
        let p = parse_player("9,solo,,100,50,1").unwrap();
        assert_eq!(p.alliance_id, 0);
    }

    #[test]
    fn encoded_plus_stays_plus_until_cleaned() {
        // `%2B` decodes to '+', which the name cleaner then turns into a space.
        let a = parse_alliance("3,A%2BB,10,2,2,1").unwrap();
        assert_eq!(a.name, "A B");
    }

    #[test]
    fn town_columns_map_to_island_position() {
        let t = parse_town("1001,848,Town+name,512,488,3,1200").unwrap();
        assert_eq!(
            t,
            TownRow {
                player_id: 848,
                town: Town { x: 512, y: 488, slot: 3 }
            }
        );
    }

    #[test]
    fn ghost_town_has_player_zero() {
        let t = parse_town("1002,,Ghost,500,500,1,200").unwrap();
        assert_eq!(t.player_id, 0);
    }

    #[test]
    fn non_numeric_ids_reject_the_line() {
        assert!(parse_player("abc,name,1").is_none());
        assert!(parse_town("1,2,n,x,5,1").is_none());
    }

    #[test]
    fn invalid_utf8_escape_rejects_the_line() {
        assert!(split_fields("1,%FF%FE,2").is_none());
    }
}
