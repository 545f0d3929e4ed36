//! Leave the current room.

use anyhow::Result;

use super::Workspace;

/// Run the disconnect command. Local data and the device id are kept.
pub async fn run(ws: &Workspace) -> Result<()> {
    let engine = ws.engine()?;
    let Some(code) = engine.current_room_code() else {
        println!("Not in a room.");
        return Ok(());
    };

    engine.disconnect()?;
    println!("Left room {}", code);
    println!("Local data is kept; rejoin with 'stellar-sync pair --join {}'", code);

    Ok(())
}
