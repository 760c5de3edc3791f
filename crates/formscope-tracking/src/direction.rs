use crate::{
    frame::{Frame, TeamSide},
    geometry::DirectionFlip,
};

/// Reverses the direction of play from the start of the second half onwards.
///
/// Teams swap ends at half time; negating both coordinates of every player
/// from the first period-2 frame keeps each team attacking the same way for
/// the whole match. Frames are expected in chronological order.
///
/// Returns the index of the first flipped frame, or `None` when the frames
/// contain no second half.
pub fn flip_second_half(frames: &mut [Frame]) -> Option<usize> {
    let start = frames.iter().position(|frame| frame.period == 2)?;
    for frame in &mut frames[start..] {
        for side in TeamSide::ALL {
            for player in frame.players_mut(side) {
                let flipped = DirectionFlip::Reversed.apply(player.position());
                player.xyz[0] = flipped.x;
                player.xyz[1] = flipped.y;
            }
        }
    }
    Some(start)
}
