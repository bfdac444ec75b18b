//! One-shot spherical trigger zones keyed off the player's position.

use crate::collision::Vec3;

/// Handle to a zone in a [`TriggerZones`] registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId(pub u32);

/// A sphere that fires once when the player's position enters it.
#[derive(Clone, Debug, PartialEq)]
pub struct TriggerZone {
    pub position: Vec3,
    pub radius: f32,
    /// Asset played when the zone fires.
    pub audio_asset: String,
    has_fired: bool,
}

impl TriggerZone {
    pub fn new(position: Vec3, radius: f32, audio_asset: impl Into<String>) -> Self {
        Self {
            position,
            radius: radius.max(0.0),
            audio_asset: audio_asset.into(),
            has_fired: false,
        }
    }

    /// Inclusive: a player exactly on the boundary is inside.
    #[inline]
    pub fn contains(&self, point: &Vec3) -> bool {
        (point - self.position).norm() <= self.radius
    }

    #[inline]
    pub fn has_fired(&self) -> bool {
        self.has_fired
    }

    /// Latch the zone if `point` is inside. Returns true only the first time.
    fn try_fire(&mut self, point: &Vec3) -> bool {
        if self.has_fired || !self.contains(point) {
            return false;
        }
        self.has_fired = true;
        true
    }
}

/// Registry of armed zones.
#[derive(Clone, Debug, Default)]
pub struct TriggerZones {
    zones: Vec<TriggerZone>,
}

impl TriggerZones {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a zone. If the player is already inside it fires right away,
    /// so a zone armed around the spawn point still plays.
    pub fn arm<F>(&mut self, zone: TriggerZone, player: &Vec3, mut on_fire: F) -> ZoneId
    where
        F: FnMut(ZoneId, &TriggerZone),
    {
        let id = ZoneId(self.zones.len() as u32);
        self.zones.push(zone);
        let zone = &mut self.zones[id.0 as usize];
        if zone.try_fire(player) {
            on_fire(id, zone);
        }
        id
    }

    /// Check every unfired zone against the player position, firing each at
    /// most once over the registry's lifetime. Returns the zones fired now.
    pub fn evaluate<F>(&mut self, player: &Vec3, mut on_fire: F) -> Vec<ZoneId>
    where
        F: FnMut(ZoneId, &TriggerZone),
    {
        let mut fired = Vec::new();
        for (index, zone) in self.zones.iter_mut().enumerate() {
            if zone.try_fire(player) {
                let id = ZoneId(index as u32);
                on_fire(id, zone);
                fired.push(id);
            }
        }
        fired
    }

    pub fn get(&self, id: ZoneId) -> Option<&TriggerZone> {
        self.zones.get(id.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ZoneId, &TriggerZone)> {
        self.zones
            .iter()
            .enumerate()
            .map(|(index, zone)| (ZoneId(index as u32), zone))
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Zones that have not fired yet.
    pub fn pending(&self) -> usize {
        self.zones.iter().filter(|zone| !zone.has_fired).count()
    }
}
