// Players as seen by the game layer: identity, label, and the equipped vehicle.

pub type PlayerId = u64;

/// Base movement speed (pixels per second) before any vehicle multiplier.
pub const BASE_MOVEMENT_SPEED: f32 = 175.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleType {
    Bike,
    Skateboard,
    Horse,
}

impl VehicleType {
    pub fn speed_multiplier(self) -> f32 {
        match self {
            VehicleType::Skateboard => 1.5,
            VehicleType::Bike => 2.0,
            VehicleType::Horse => 2.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vehicle {
    pub vehicle_type: VehicleType,
    pub speed_multiplier: f32,
}

impl Vehicle {
    pub fn new(vehicle_type: VehicleType) -> Self {
        Self {
            vehicle_type,
            speed_multiplier: vehicle_type.speed_multiplier(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    pub display_name: String,
    pub vehicle: Option<Vehicle>,
}

impl Player {
    pub fn new(id: PlayerId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            vehicle: None,
        }
    }

    /// Returns a copy of the player with the vehicle replaced (or removed).
    pub fn with_vehicle(&self, vehicle_type: Option<VehicleType>) -> Self {
        Self {
            vehicle: vehicle_type.map(Vehicle::new),
            ..self.clone()
        }
    }

    pub fn movement_speed(&self) -> f32 {
        let multiplier = self.vehicle.map_or(1.0, |v| v.speed_multiplier);
        BASE_MOVEMENT_SPEED * multiplier
    }
}
