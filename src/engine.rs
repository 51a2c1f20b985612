use crate::{demo::DemoState, rendering::draw_list::DrawList};

/// Advances the demo and records this frame's draws.
pub fn update(state: &mut DemoState, draw_list: &mut DrawList, aspect_ratio: f32) {
    state.update();

    draw_list.clear();
    let view_projection = state.camera.view_projection(aspect_ratio);
    state.scene.draw(&view_projection, draw_list);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_pyramid_draws_side_and_base() {
        let mut state = DemoState::new().unwrap();
        let mut draw_list = DrawList::new();

        update(&mut state, &mut draw_list, 1.0);
        assert_eq!(draw_list.commands().len(), 4);

        update(&mut state, &mut draw_list, 1.0);
        assert_eq!(draw_list.commands().len(), 4);

        let (vertices, ranges) = draw_list.triangle_lists();
        // 6 + 6 triangles for the center, 4 + 4 for the satellite
        assert_eq!(vertices.len(), (6 + 6 + 4 + 4) * 3);
        assert_eq!(ranges.len(), 4);
    }
}
