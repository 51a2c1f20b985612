use glam::{Vec2, Vec3};

use crate::{
    camera::Camera,
    scene_graph::{
        animated::{Orbit, Spinner},
        pyramid::{Pyramid, PyramidDesc},
        scene::Scene,
        scene_node::SceneNode,
    },
};

const WHITE: u32 = 0xFFFFFFFF;
const RED: u32 = 0xFF0000FF;
const GREEN: u32 = 0x00FF00FF;
const YELLOW: u32 = 0xFFFF00FF;
const BLUE: u32 = 0x0000FFFF;
const CYAN: u32 = 0x00FFFFFF;

pub struct DemoState {
    pub camera: Camera,
    pub start_time: std::time::Instant,
    pub scene: Scene,
}

impl DemoState {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            camera: Camera::default(),
            start_time: std::time::Instant::now(),
            scene: build_scene()?,
        })
    }

    pub fn update(&mut self) {
        let t = self.start_time.elapsed().as_secs_f64();
        self.scene.update(t);
    }
}

fn build_scene() -> anyhow::Result<Scene> {
    let mut scene = Scene::new();

    let mut turntable = Spinner::new("turntable", Vec3::Z, 0.4)?;
    turntable.base_mut().add_child(Pyramid::new(
        "center",
        PyramidDesc {
            radius: 1.0,
            height: 1.5,
            sides: 6,
            tip_color: WHITE,
            color1: RED,
            color2: GREEN,
        },
    )?);

    let mut satellite_spin = Spinner::new("satellite_spin", Vec3::new(1.0, 1.0, 0.0), 2.0)?;
    satellite_spin.base_mut().add_child(Pyramid::new(
        "satellite_body",
        PyramidDesc {
            radius: 0.4,
            height: 0.8,
            sides: 4,
            tip_color: YELLOW,
            color1: BLUE,
            color2: CYAN,
        },
    )?);

    let mut satellite = Orbit::new("satellite", Vec2::ZERO, Vec3::new(2.2, 0.0, 0.3), 1.1);
    satellite.base_mut().add_child(satellite_spin);
    turntable.base_mut().add_child(satellite);

    scene.add(turntable);

    log::info!("Built scene with {} nodes", scene.node_count());
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_scene_layout() {
        let state = DemoState::new().unwrap();
        assert_eq!(state.scene.node_count(), 6);
        for name in ["turntable", "center", "satellite", "satellite_spin", "satellite_body"] {
            assert!(state.scene.get_node_by_name(name).is_some(), "{name}");
        }
    }
}
