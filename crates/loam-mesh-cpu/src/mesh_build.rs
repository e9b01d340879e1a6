use loam_geom::Vec3;

use crate::face::Face;

/// Flat vertex streams for one material pass.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct MeshBuild {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub uv: Vec<f32>,
    pub idx: Vec<u32>,
    pub col: Vec<u8>,
}

impl MeshBuild {
    #[inline]
    pub fn clear_keep_capacity(&mut self) {
        self.pos.clear();
        self.norm.clear();
        self.uv.clear();
        self.idx.clear();
        self.col.clear();
    }

    #[inline]
    pub fn reserve_quads(&mut self, n_quads: usize) {
        self.pos.reserve(n_quads * 4 * 3);
        self.norm.reserve(n_quads * 4 * 3);
        self.uv.reserve(n_quads * 4 * 2);
        self.col.reserve(n_quads * 4 * 4);
        self.idx.reserve(n_quads * 6);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / 3
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.idx.len() / 6
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    /// Appends the unit face of the voxel whose minimum corner is `origin`.
    /// UVs span the face once.
    pub fn add_face(&mut self, face: Face, origin: Vec3, rgba: [u8; 4]) {
        const UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let base = self.vertex_count() as u32;
        let n = face.normal();
        for (corner, uv) in face.unit_corners().into_iter().zip(UVS) {
            let p = origin + corner;
            self.pos.extend_from_slice(&[p.x, p.y, p.z]);
            self.norm.extend_from_slice(&[n.x, n.y, n.z]);
            self.uv.extend_from_slice(&uv);
            self.col.extend_from_slice(&rgba);
        }
        self.idx
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    pub fn positions(&self) -> &[f32] {
        &self.pos
    }

    pub fn normals(&self) -> &[f32] {
        &self.norm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_face_appends_one_quad() {
        let mut m = MeshBuild::default();
        m.add_face(Face::PosY, Vec3::new(2.0, 3.0, 4.0), [1, 2, 3, 4]);
        m.add_face(Face::NegX, Vec3::ZERO, [0; 4]);
        assert_eq!(m.quad_count(), 2);
        assert_eq!(m.vertex_count(), 8);
        assert_eq!(&m.idx[6..], &[4, 5, 6, 4, 6, 7]);
        assert_eq!(&m.pos[..3], &[2.0, 4.0, 4.0]);
        assert_eq!(&m.col[..4], &[1, 2, 3, 4]);
        m.clear_keep_capacity();
        assert!(m.is_empty());
    }
}
