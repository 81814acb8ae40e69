mod angle;
mod polyline;
mod stations;
mod vertex;

pub use {
    angle::{heading, slope_deg},
    polyline::{planar_length, position_along, resample},
    stations::{stations, MAX_STATIONS},
    vertex::Vertex,
};
