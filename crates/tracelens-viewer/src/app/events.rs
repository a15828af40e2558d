use bevy::prelude::Event;

use crate::canvas::ViewScales;

/// Canvas hover changed (or was re-confirmed) by a pointer move.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointHovered(pub Option<usize>);

/// A click landed on a point.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointClicked {
    pub case: u32,
    pub sentence: u32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ScalesChanged(pub ViewScales);
