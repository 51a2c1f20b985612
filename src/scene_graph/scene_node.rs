use crate::{math::Matrix4, rendering::draw_list::GeometrySink};

/// State shared by every node: a local-to-parent transform and the children
/// this node exclusively owns.
///
/// Dropping a node drops its whole subtree.
pub struct NodeBase {
    pub name: String,
    pub transform: Matrix4,
    children: Vec<Box<dyn SceneNode>>,
}

impl NodeBase {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Matrix4::IDENTITY,
            children: Vec::new(),
        }
    }

    /// Appends a child and returns its index. Children are updated and drawn
    /// in insertion order.
    pub fn add_child(&mut self, child: impl SceneNode + 'static) -> usize {
        self.add_boxed_child(Box::new(child))
    }

    pub fn add_boxed_child(&mut self, child: Box<dyn SceneNode>) -> usize {
        self.children.push(child);
        self.children.len() - 1
    }

    pub fn children(&self) -> &[Box<dyn SceneNode>] {
        &self.children
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut (dyn SceneNode + 'static)> {
        self.children.get_mut(index).map(|child| child.as_mut())
    }

    pub fn update_children(&mut self, t: f64) {
        for child in &mut self.children {
            child.update(t);
        }
    }

    pub fn draw_children(&mut self, transform: &Matrix4, sink: &mut dyn GeometrySink) {
        for child in &mut self.children {
            child.draw(transform, sink);
        }
    }
}

/// A node in the scene tree.
///
/// Implementors only need to expose their [`NodeBase`]; the default `update`
/// and `draw` propagate to children. Overrides that still want their
/// children traversed must call [`NodeBase::update_children`] or
/// [`NodeBase::draw_children`] themselves.
pub trait SceneNode {
    fn base(&self) -> &NodeBase;

    fn base_mut(&mut self) -> &mut NodeBase;

    fn update(&mut self, t: f64) {
        self.base_mut().update_children(t);
    }

    fn draw(&mut self, parent_transform: &Matrix4, sink: &mut dyn GeometrySink) {
        let effective = parent_transform * &self.base().transform;
        self.base_mut().draw_children(&effective, sink);
    }

    fn name(&self) -> &str {
        &self.base().name
    }

    fn transform(&self) -> &Matrix4 {
        &self.base().transform
    }

    fn transform_mut(&mut self) -> &mut Matrix4 {
        &mut self.base_mut().transform
    }

    /// Number of nodes in this subtree, including `self`.
    fn subtree_len(&self) -> usize {
        1 + self
            .base()
            .children()
            .iter()
            .map(|child| child.subtree_len())
            .sum::<usize>()
    }
}

impl<'a> dyn SceneNode + 'a {
    /// Depth-first search of this subtree by name.
    pub fn find(&self, name: &str) -> Option<&dyn SceneNode> {
        if self.name() == name {
            return Some(self);
        }
        self.base()
            .children()
            .iter()
            .find_map(|child| child.find(name))
    }
}

/// A node with no behavior of its own, used to group and offset children.
pub struct Group {
    base: NodeBase,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: NodeBase::new(name),
        }
    }

    pub fn with_transform(mut self, transform: Matrix4) -> Self {
        self.base.transform = transform;
        self
    }

    pub fn with_child(mut self, child: impl SceneNode + 'static) -> Self {
        self.base.add_child(child);
        self
    }
}

impl SceneNode for Group {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use glam::Vec3;

    use super::*;
    use crate::rendering::{
        draw_list::{DrawList, Topology},
        vertex::Vertex,
    };

    /// Leaf that records the order of calls and submits one marker vertex.
    struct Probe {
        base: NodeBase,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Probe {
        fn new(name: &str, log: &Rc<RefCell<Vec<String>>>) -> Self {
            Self {
                base: NodeBase::new(name),
                log: log.clone(),
            }
        }
    }

    impl SceneNode for Probe {
        fn base(&self) -> &NodeBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut NodeBase {
            &mut self.base
        }

        fn update(&mut self, t: f64) {
            self.log.borrow_mut().push(format!("update {} {t}", self.base.name));
            self.base.update_children(t);
        }

        fn draw(&mut self, parent_transform: &Matrix4, sink: &mut dyn GeometrySink) {
            let effective = parent_transform * &self.base.transform;
            self.log.borrow_mut().push(format!("draw {}", self.base.name));
            sink.submit(
                &effective,
                Topology::TriangleFan,
                &[Vertex::new(Vec3::ZERO, 0)],
            );
            self.base.draw_children(&effective, sink);
        }
    }

    impl Drop for Probe {
        fn drop(&mut self) {
            self.log.borrow_mut().push(format!("drop {}", self.base.name));
        }
    }

    #[test]
    fn new_node_has_identity_transform() {
        let group = Group::new("root");
        assert_eq!(*group.transform(), Matrix4::IDENTITY);
        assert!(group.base().children().is_empty());
    }

    #[test]
    fn draw_composes_parent_then_local() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut child = Probe::new("child", &log);
        child.base.transform = Matrix4::from_translation(Vec3::new(0.0, 2.0, 0.0));

        let mut root = Group::new("root")
            .with_transform(Matrix4::from_translation(Vec3::new(1.0, 0.0, 3.0)))
            .with_child(child);

        let mut list = DrawList::new();
        root.draw(&Matrix4::IDENTITY, &mut list);

        assert_eq!(list.commands().len(), 1);
        let translation = list.commands()[0].transform.translation();
        assert!((translation - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn draw_applies_the_incoming_camera_transform_first() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut root = Group::new("root")
            .with_transform(Matrix4::from_translation(Vec3::X))
            .with_child(Probe::new("leaf", &log));

        let camera = Matrix4::from_rotation(Vec3::Z, std::f32::consts::FRAC_PI_2).unwrap();
        let mut list = DrawList::new();
        root.draw(&camera, &mut list);

        let effective = list.commands()[0].transform;
        assert!(effective.approx_eq(&(camera * Matrix4::from_translation(Vec3::X)), 1e-6));
        assert!((effective.translation() - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn traversal_follows_insertion_order_depth_first() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut a = Probe::new("a", &log);
        a.base.add_child(Probe::new("a1", &log));
        let mut root = Group::new("root")
            .with_child(a)
            .with_child(Probe::new("b", &log));

        root.update(1.5);
        root.draw(&Matrix4::IDENTITY, &mut DrawList::new());

        assert_eq!(
            *log.borrow(),
            vec![
                "update a 1.5",
                "update a1 1.5",
                "update b 1.5",
                "draw a",
                "draw a1",
                "draw b",
            ]
        );
    }

    #[test]
    fn base_update_does_not_touch_own_transform() {
        let mut root = Group::new("root").with_transform(Matrix4::from_translation(Vec3::Z));
        root.update(10.0);
        assert_eq!(*root.transform(), Matrix4::from_translation(Vec3::Z));
    }

    #[test]
    fn dropping_a_node_drops_its_subtree() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut a = Probe::new("a", &log);
        a.base.add_child(Probe::new("a1", &log));
        let root = Group::new("root").with_child(a);

        drop(root);

        assert_eq!(*log.borrow(), vec!["drop a", "drop a1"]);
    }

    #[test]
    fn subtree_len_and_find() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut a = Probe::new("a", &log);
        a.base.add_child(Probe::new("a1", &log));
        let mut root = Group::new("root").with_child(a);
        let b = root.base_mut().add_child(Group::new("b"));

        assert_eq!(b, 1);
        assert_eq!(root.subtree_len(), 4);
        let tree: &dyn SceneNode = &root;
        assert_eq!(tree.find("a1").map(|node| node.name()), Some("a1"));
        assert!(tree.find("missing").is_none());

        let child = root.base_mut().child_mut(1).unwrap();
        child.transform_mut().translate(1.0, 0.0, 0.0);
        assert_eq!(root.base().children()[1].transform().translation(), Vec3::X);
    }
}
