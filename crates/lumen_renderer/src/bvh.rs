//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Nodes live in a flat arena and address each other by index; leaves hold
//! a range into a permutation of the scene's shape indices. The tree is
//! built once and only read during rendering, so it is shared across render
//! threads without locking.

use crate::{HitRecord, Shape};
use lumen_math::{Aabb, Interval, Ray, Vec3};

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// Traversal stack size. Median splits keep the depth near log2(n / 4).
const MAX_STACK: usize = 64;

/// BVH node - either a branch with two children or a leaf with primitives.
#[derive(Debug, Clone)]
enum NodeKind {
    /// Internal node, children are arena indices.
    Branch { left: usize, right: usize },
    /// `count` entries of the permutation starting at `start`.
    Leaf { start: usize, count: usize },
}

#[derive(Debug, Clone)]
struct BvhNode {
    bbox: Aabb,
    kind: NodeKind,
}

/// Per-shape data cached for construction.
struct BuildEntry {
    shape: usize,
    bbox: Aabb,
    centroid: Vec3,
}

/// Bounding volume hierarchy over a shape list.
#[derive(Debug, Clone, Default)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    /// Shape indices in leaf order
    order: Vec<usize>,
}

impl Bvh {
    /// Build a BVH over `shapes`.
    ///
    /// Shapes with an empty bounding box (degenerate geometry) are left out,
    /// since nothing can hit them.
    pub fn build(shapes: &[Box<dyn Shape>]) -> Self {
        let mut entries: Vec<BuildEntry> = shapes
            .iter()
            .enumerate()
            .filter_map(|(shape, s)| {
                let bbox = s.bounding_box();
                (!bbox.is_empty()).then(|| BuildEntry {
                    shape,
                    bbox,
                    centroid: bbox.centroid(),
                })
            })
            .collect();

        let skipped = shapes.len() - entries.len();
        if skipped > 0 {
            log::debug!("BVH skipped {} degenerate shapes", skipped);
        }

        let mut bvh = Self {
            nodes: Vec::with_capacity(2 * entries.len() / LEAF_MAX_SIZE + 1),
            order: Vec::with_capacity(entries.len()),
        };
        if !entries.is_empty() {
            bvh.build_node(&mut entries);
        }

        log::debug!(
            "Built BVH: {} shapes, {} nodes, depth {}",
            bvh.order.len(),
            bvh.nodes.len(),
            bvh.depth()
        );
        bvh
    }

    /// Recursive construction; returns the arena index of the new node.
    ///
    /// Median split: partition entries by centroid on the longest axis of
    /// the centroid bounds and recurse on both halves.
    fn build_node(&mut self, entries: &mut [BuildEntry]) -> usize {
        let bbox = entries
            .iter()
            .fold(Aabb::EMPTY, |acc, e| Aabb::surrounding(&acc, &e.bbox));

        let index = self.nodes.len();

        if entries.len() <= LEAF_MAX_SIZE {
            let start = self.order.len();
            self.order.extend(entries.iter().map(|e| e.shape));
            self.nodes.push(BvhNode {
                bbox,
                kind: NodeKind::Leaf {
                    start,
                    count: entries.len(),
                },
            });
            return index;
        }

        let centroid_bounds = Aabb::enclosing(entries.iter().map(|e| e.centroid));
        let axis = centroid_bounds.longest_axis();

        let mid = entries.len() / 2;
        entries.select_nth_unstable_by(mid, |a, b| {
            a.centroid[axis]
                .partial_cmp(&b.centroid[axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        // Reserve the slot, children are filled in after recursion
        self.nodes.push(BvhNode {
            bbox,
            kind: NodeKind::Leaf { start: 0, count: 0 },
        });
        let (left_entries, right_entries) = entries.split_at_mut(mid);
        let left = self.build_node(left_entries);
        let right = self.build_node(right_entries);
        self.nodes[index].kind = NodeKind::Branch { left, right };

        index
    }

    /// Nearest hit within `ray.t`, ignoring shape `skip`.
    ///
    /// An empty BVH yields `None`.
    pub fn intersect(
        &self,
        shapes: &[Box<dyn Shape>],
        ray: &Ray,
        skip: Option<usize>,
    ) -> Option<HitRecord> {
        let (shape, t) = self.traverse(shapes, ray, skip, false)?;
        let point = ray.at(t);
        Some(HitRecord {
            shape,
            t,
            point,
            normal: shapes[shape].normal_at(point),
        })
    }

    /// True if anything other than `skip` is hit within `ray.t`.
    /// Stops at the first hit found.
    pub fn occluded(&self, shapes: &[Box<dyn Shape>], ray: &Ray, skip: Option<usize>) -> bool {
        self.traverse(shapes, ray, skip, true).is_some()
    }

    fn traverse(
        &self,
        shapes: &[Box<dyn Shape>],
        ray: &Ray,
        skip: Option<usize>,
        any_hit: bool,
    ) -> Option<(usize, f32)> {
        let root = self.nodes.first()?;
        let root_entry = root.bbox.hit(ray, ray.t)?;

        let mut closest = ray.t.max;
        let mut best = None;

        let mut stack = [(0usize, 0.0f32); MAX_STACK];
        stack[0] = (0, root_entry);
        let mut len = 1;

        while len > 0 {
            len -= 1;
            let (index, entry) = stack[len];
            // A closer hit was found after this node was queued
            if entry > closest {
                continue;
            }

            match self.nodes[index].kind {
                NodeKind::Leaf { start, count } => {
                    for &shape in &self.order[start..start + count] {
                        if Some(shape) == skip {
                            continue;
                        }
                        let probe = Ray {
                            t: ray.t.clip_max(closest),
                            ..*ray
                        };
                        if let Some(t) = shapes[shape].intersect(&probe) {
                            if t <= closest {
                                closest = t;
                                best = Some((shape, t));
                                if any_hit {
                                    return best;
                                }
                            }
                        }
                    }
                }
                NodeKind::Branch { left, right } => {
                    let range = Interval::new(ray.t.min, closest);
                    let left_entry = self.nodes[left].bbox.hit(ray, range);
                    let right_entry = self.nodes[right].bbox.hit(ray, range);

                    // Push the farther child first so the nearer one is popped next
                    let mut push = |child: usize, entry: Option<f32>| {
                        if let Some(entry) = entry {
                            if len < MAX_STACK {
                                stack[len] = (child, entry);
                                len += 1;
                            }
                        }
                    };
                    match (left_entry, right_entry) {
                        (Some(l), Some(r)) if l < r => {
                            push(right, right_entry);
                            push(left, left_entry);
                        }
                        _ => {
                            push(left, left_entry);
                            push(right, right_entry);
                        }
                    }
                }
            }
        }

        best
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of levels (0 for an empty tree).
    pub fn depth(&self) -> usize {
        fn depth_of(nodes: &[BvhNode], index: usize) -> usize {
            match nodes[index].kind {
                NodeKind::Leaf { .. } => 1,
                NodeKind::Branch { left, right } => {
                    1 + depth_of(nodes, left).max(depth_of(nodes, right))
                }
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            depth_of(&self.nodes, 0)
        }
    }
}
