//! Text protocol spoken with the game engine over stdin/stdout.
//!
//! The engine sends three startup lines (our player id, the map bounds,
//! and the initial state), then one state line per turn; we answer the
//! startup with our name and each turn with one line of orders. State
//! lines are flat whitespace-separated token streams; a handful of
//! fields the engine still sends are dead weight and are skipped here so
//! nothing downstream ever sees them.

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

use std::io::{BufRead, Write};
use std::str::SplitWhitespace;

use armada_core::{
    DockedStatus, Handshake, Order, PlanetId, PlanetObservation, PlayerId, PlayerObservation,
    ShipId, ShipObservation, TurnObservation,
};
use glam::DVec2;
use thiserror::Error;

/// Failure while reading from or writing to the engine.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The stream ended inside a message.
    #[error("engine closed the stream mid-message")]
    UnexpectedEof,
    /// A token that should have been an integer was not.
    #[error("expected an integer, got {0:?}")]
    BadInt(String),
    /// A token that should have been a number was not.
    #[error("expected a number, got {0:?}")]
    BadFloat(String),
    /// A docked-status code outside the known set.
    #[error("unknown docked status code {0}")]
    BadDockedStatus(i64),
    /// The underlying stream failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Buffered two-way connection to the engine.
pub struct Connection<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Connection<R, W> {
    /// Wraps the given streams. Nothing is read or written yet.
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Reads the two startup lines sent before the first state.
    pub fn handshake(&mut self) -> Result<Handshake, ProtocolError> {
        let id_line = self.read_line()?.ok_or(ProtocolError::UnexpectedEof)?;
        let player_id = PlayerId::new(Tokens::new(&id_line).next_u32()?);
        let bounds_line = self.read_line()?.ok_or(ProtocolError::UnexpectedEof)?;
        let mut tokens = Tokens::new(&bounds_line);
        let width = tokens.next_f64()?;
        let height = tokens.next_f64()?;
        Ok(Handshake {
            player_id,
            width,
            height,
        })
    }

    /// Announces our name, completing the startup exchange.
    pub fn send_name(&mut self, name: &str) -> Result<(), ProtocolError> {
        writeln!(self.writer, "{name}")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Reads one turn's state line.
    ///
    /// Returns the parsed observation together with the raw line, kept for
    /// failure diagnostics. `None` means the engine closed the stream at a
    /// turn boundary, which is how games end.
    pub fn read_turn(&mut self) -> Result<Option<(TurnObservation, String)>, ProtocolError> {
        let Some(line) = self.read_line()? else {
            return Ok(None);
        };
        let observation = parse_turn(&line)?;
        Ok(Some((observation, line)))
    }

    /// Sends every order for this turn as a single line.
    ///
    /// An empty order set still sends the line; the engine expects exactly
    /// one response per turn.
    pub fn send_orders(
        &mut self,
        orders: &[Order],
        include_tags: bool,
    ) -> Result<(), ProtocolError> {
        let line = orders
            .iter()
            .map(|order| order.encode(include_tags))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>, ProtocolError> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }
}

/// Parses one full state line into an observation.
fn parse_turn(line: &str) -> Result<TurnObservation, ProtocolError> {
    let mut tokens = Tokens::new(line);

    let player_count = tokens.next_usize()?;
    let mut players = Vec::with_capacity(player_count);
    for _ in 0..player_count {
        let player = PlayerId::new(tokens.next_u32()?);
        let ship_count = tokens.next_usize()?;
        let mut ships = Vec::with_capacity(ship_count);
        for _ in 0..ship_count {
            ships.push(parse_ship(&mut tokens)?);
        }
        players.push(PlayerObservation { player, ships });
    }

    let planet_count = tokens.next_usize()?;
    let mut planets = Vec::with_capacity(planet_count);
    for _ in 0..planet_count {
        planets.push(parse_planet(&mut tokens)?);
    }

    Ok(TurnObservation { players, planets })
}

fn parse_ship(tokens: &mut Tokens<'_>) -> Result<ShipObservation, ProtocolError> {
    let id = ShipId::new(tokens.next_u32()?);
    let x = tokens.next_f64()?;
    let y = tokens.next_f64()?;
    let hp = tokens.next_i32()?;
    // Engine still sends a velocity pair, always zero.
    tokens.skip(2)?;
    let status_code = tokens.next_i64()?;
    let docked_status = DockedStatus::from_wire(status_code)
        .ok_or(ProtocolError::BadDockedStatus(status_code))?;
    let planet_token = tokens.next_u32()?;
    let docked_planet = if docked_status == DockedStatus::Undocked {
        None
    } else {
        Some(PlanetId::new(planet_token))
    };
    let docking_progress = tokens.next_i32()?;
    // Weapon cooldown, also dead.
    tokens.skip(1)?;
    Ok(ShipObservation {
        id,
        position: DVec2::new(x, y),
        hp,
        docked_status,
        docked_planet,
        docking_progress,
    })
}

fn parse_planet(tokens: &mut Tokens<'_>) -> Result<PlanetObservation, ProtocolError> {
    let id = PlanetId::new(tokens.next_u32()?);
    let x = tokens.next_f64()?;
    let y = tokens.next_f64()?;
    let hp = tokens.next_i32()?;
    let radius = tokens.next_f64()?;
    let docking_spots = tokens.next_u32()?;
    let current_production = tokens.next_i32()?;
    // Remaining production is unused by the engine.
    tokens.skip(1)?;
    let owned = tokens.next_i64()?;
    let owner_token = tokens.next_u32()?;
    let owner = (owned != 0).then(|| PlayerId::new(owner_token));
    let docked_count = tokens.next_usize()?;
    let mut docked_ships = Vec::with_capacity(docked_count);
    for _ in 0..docked_count {
        docked_ships.push(ShipId::new(tokens.next_u32()?));
    }
    Ok(PlanetObservation {
        id,
        position: DVec2::new(x, y),
        hp,
        radius,
        docking_spots,
        current_production,
        owner,
        docked_ships,
    })
}

/// Whitespace tokenizer with typed, error-reporting accessors.
struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(line: &'a str) -> Self {
        Self {
            inner: line.split_whitespace(),
        }
    }

    fn next_token(&mut self) -> Result<&'a str, ProtocolError> {
        self.inner.next().ok_or(ProtocolError::UnexpectedEof)
    }

    fn next_u32(&mut self) -> Result<u32, ProtocolError> {
        let token = self.next_token()?;
        token
            .parse()
            .map_err(|_| ProtocolError::BadInt(token.to_owned()))
    }

    fn next_i32(&mut self) -> Result<i32, ProtocolError> {
        let token = self.next_token()?;
        token
            .parse()
            .map_err(|_| ProtocolError::BadInt(token.to_owned()))
    }

    fn next_i64(&mut self) -> Result<i64, ProtocolError> {
        let token = self.next_token()?;
        token
            .parse()
            .map_err(|_| ProtocolError::BadInt(token.to_owned()))
    }

    fn next_usize(&mut self) -> Result<usize, ProtocolError> {
        let token = self.next_token()?;
        token
            .parse()
            .map_err(|_| ProtocolError::BadInt(token.to_owned()))
    }

    fn next_f64(&mut self) -> Result<f64, ProtocolError> {
        let token = self.next_token()?;
        token
            .parse()
            .map_err(|_| ProtocolError::BadFloat(token.to_owned()))
    }

    fn skip(&mut self, count: usize) -> Result<(), ProtocolError> {
        for _ in 0..count {
            let _ = self.next_token()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use armada_core::MessageTag;

    use super::*;

    fn connect(input: &str) -> Connection<Cursor<Vec<u8>>, Vec<u8>> {
        Connection::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn handshake_reads_id_and_bounds() {
        let mut conn = connect("1\n240 160\n");
        let handshake = conn.handshake().expect("handshake parses");
        assert_eq!(handshake.player_id, PlayerId::new(1));
        assert_eq!(handshake.width, 240.0);
        assert_eq!(handshake.height, 160.0);
    }

    #[test]
    fn turn_line_parses_ships_and_planets() {
        // One player with one docked ship, one owned planet hosting it.
        let line = "1 0 1 3 10.5 20.25 255 0 0 2 7 5 0 \
                    1 7 60 80 1531 8.5 4 12 994 1 0 1 3\n";
        let mut conn = connect(line);
        let (observation, raw) = conn
            .read_turn()
            .expect("line parses")
            .expect("line present");
        assert_eq!(raw, line.trim());

        assert_eq!(observation.players.len(), 1);
        let player = &observation.players[0];
        assert_eq!(player.player, PlayerId::new(0));
        let ship = &player.ships[0];
        assert_eq!(ship.id, ShipId::new(3));
        assert_eq!(ship.position, DVec2::new(10.5, 20.25));
        assert_eq!(ship.hp, 255);
        assert_eq!(ship.docked_status, DockedStatus::Docked);
        assert_eq!(ship.docked_planet, Some(PlanetId::new(7)));
        assert_eq!(ship.docking_progress, 5);

        let planet = &observation.planets[0];
        assert_eq!(planet.id, PlanetId::new(7));
        assert_eq!(planet.position, DVec2::new(60.0, 80.0));
        assert_eq!(planet.radius, 8.5);
        assert_eq!(planet.docking_spots, 4);
        assert_eq!(planet.current_production, 12);
        assert_eq!(planet.owner, Some(PlayerId::new(0)));
        assert_eq!(planet.docked_ships, vec![ShipId::new(3)]);
    }

    #[test]
    fn unowned_planet_gets_no_owner() {
        let line = "0 1 5 100 100 1200 6 3 0 950 0 0 0\n";
        let mut conn = connect(line);
        let (observation, _) = conn
            .read_turn()
            .expect("line parses")
            .expect("line present");
        assert_eq!(observation.planets[0].owner, None);
    }

    #[test]
    fn undocked_ship_ignores_planet_field() {
        let line = "1 0 1 3 10 20 255 0 0 0 7 0 0 0\n";
        let mut conn = connect(line);
        let (observation, _) = conn
            .read_turn()
            .expect("line parses")
            .expect("line present");
        let ship = &observation.players[0].ships[0];
        assert_eq!(ship.docked_status, DockedStatus::Undocked);
        assert_eq!(ship.docked_planet, None);
    }

    #[test]
    fn eof_at_turn_boundary_is_a_clean_end() {
        let mut conn = connect("");
        assert!(conn.read_turn().expect("clean end").is_none());
    }

    #[test]
    fn truncated_line_is_an_error() {
        let mut conn = connect("1 0 2 3 10 20\n");
        assert!(matches!(
            conn.read_turn(),
            Err(ProtocolError::UnexpectedEof)
        ));
    }

    #[test]
    fn unknown_docked_status_is_rejected() {
        let line = "1 0 1 3 10 20 255 0 0 9 7 0 0 0\n";
        let mut conn = connect(line);
        assert!(matches!(
            conn.read_turn(),
            Err(ProtocolError::BadDockedStatus(9))
        ));
    }

    #[test]
    fn orders_share_one_line() {
        let mut conn = connect("");
        let orders = vec![
            Order::Thrust {
                ship: ShipId::new(0),
                speed: 7,
                heading: 90,
                tag: Some(MessageTag::Assassinate),
            },
            Order::Dock {
                ship: ShipId::new(1),
                planet: PlanetId::new(2),
            },
        ];
        conn.send_orders(&orders, false).expect("orders sent");
        assert_eq!(conn.writer, b"t 0 7 90 d 1 2\n");

        conn.writer.clear();
        conn.send_orders(&orders, true).expect("orders sent");
        assert_eq!(conn.writer, b"t 0 7 44730 d 1 2\n");
    }
}
