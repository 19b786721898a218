use std::cell::Cell;

use glam::Vec3A;
use vehiclesim::sim::{RaycastHit, RaycastHits, RaycastOverflow, Scene, WindField};

/// Flat terrain and a flat water surface. Raycasts hit the terrain unless a hit list is scripted.
#[derive(Clone, Debug, Default)]
pub struct MockScene {
    pub region_id: u64,
    pub ground_height: f32,
    pub water_height: f32,
    pub wind: Option<WindField>,
    /// Returned as is by every raycast, in place of the terrain
    pub scripted_hits: Option<Vec<RaycastHit>>,
    pub raycasts: Cell<u32>,
}

impl MockScene {
    pub const TERRAIN_ID: u64 = 0;

    pub fn new() -> Self {
        Self {
            region_id: 1,
            water_height: -100.0,
            ..Self::default()
        }
    }

    pub fn with_hits(mut self, hits: Vec<RaycastHit>) -> Self {
        self.scripted_hits = Some(hits);
        self
    }

    pub fn with_wind(mut self, wind: WindField) -> Self {
        self.wind = Some(wind);
        self
    }

    pub const fn with_water_height(mut self, water_height: f32) -> Self {
        self.water_height = water_height;
        self
    }

    fn terrain_hit(&self, origin: Vec3A, direction: Vec3A, distance: f32) -> Option<RaycastHit> {
        if direction.z >= 0.0 {
            return None;
        }

        let dist = (origin.z - self.ground_height) / -direction.z;
        (0.0..=distance).contains(&dist).then(|| RaycastHit {
            body_id: Self::TERRAIN_ID,
            distance: dist,
            position: origin + direction * dist,
        })
    }
}

impl Scene for MockScene {
    fn region_id(&self) -> u64 {
        self.region_id
    }

    fn raycast(
        &self,
        origin: Vec3A,
        direction: Vec3A,
        distance: f32,
        capacity: usize,
        hits: &mut RaycastHits,
    ) -> Result<(), RaycastOverflow> {
        self.raycasts.set(self.raycasts.get() + 1);

        let found = match &self.scripted_hits {
            Some(scripted) => scripted.clone(),
            None => self
                .terrain_hit(origin, direction, distance)
                .into_iter()
                .collect(),
        };

        if found.len() > capacity {
            return Err(RaycastOverflow);
        }

        hits.extend(found);
        Ok(())
    }

    fn ground_height_at(&self, _x: f32, _y: f32) -> f32 {
        self.ground_height
    }

    fn water_height_at(&self, _x: f32, _y: f32) -> f32 {
        self.water_height
    }

    fn wind_field(&self) -> Option<&WindField> {
        self.wind.as_ref()
    }
}
