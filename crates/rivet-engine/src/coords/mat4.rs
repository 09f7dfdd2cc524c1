use super::Vec2;

/// Column-major 4x4 matrix, laid out the way WGSL `mat4x4<f32>` expects.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Translation by `(x, y, z)`.
    pub const fn translation(x: f32, y: f32, z: f32) -> Mat4 {
        Mat4 {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// 2D translation, the model transform used for UI geometry.
    #[inline]
    pub const fn translation_2d(t: Vec2) -> Mat4 {
        Mat4::translation(t.x, t.y, 0.0)
    }

    /// Orthographic projection with a `[0, 1]` depth range.
    ///
    /// `top < bottom` yields a +Y-down space, which is what UI layers use:
    /// `Mat4::ortho(0.0, w, h, 0.0, -1.0, 1.0)`.
    pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        let sx = 2.0 / (right - left);
        let sy = 2.0 / (top - bottom);
        let sz = 1.0 / (far - near);
        let tx = (left + right) / (left - right);
        let ty = (top + bottom) / (bottom - top);
        let tz = near / (near - far);

        Mat4 {
            cols: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, sz, 0.0],
                [tx, ty, tz, 1.0],
            ],
        }
    }

    /// Matrix product `self * rhs` (apply `rhs` first).
    pub fn mul(&self, rhs: &Mat4) -> Mat4 {
        let mut out = [[0.0f32; 4]; 4];
        for (c, col) in out.iter_mut().enumerate() {
            for (r, cell) in col.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.cols[k][r] * rhs.cols[c][k]).sum();
            }
        }
        Mat4 { cols: out }
    }

    #[inline]
    pub fn translation_part(&self) -> Vec2 {
        Vec2::new(self.cols[3][0], self.cols[3][1])
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Mat4::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `m * (x, y, 0, 1)`, keeping `(x, y)`.
    fn apply(m: &Mat4, p: Vec2) -> Vec2 {
        let c = &m.cols;
        Vec2::new(
            c[0][0] * p.x + c[1][0] * p.y + c[3][0],
            c[0][1] * p.x + c[1][1] * p.y + c[3][1],
        )
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-5 && (a.y - b.y).abs() < 1e-5
    }

    #[test]
    fn ortho_maps_ui_corners_to_clip_space() {
        let p = Mat4::ortho(0.0, 1280.0, 720.0, 0.0, -1.0, 1.0);
        assert!(close(apply(&p, Vec2::new(0.0, 0.0)), Vec2::new(-1.0, 1.0)));
        assert!(close(apply(&p, Vec2::new(1280.0, 720.0)), Vec2::new(1.0, -1.0)));
        assert!(close(apply(&p, Vec2::new(640.0, 360.0)), Vec2::ZERO));
    }

    #[test]
    fn ortho_depth_range_is_zero_to_one() {
        let p = Mat4::ortho(0.0, 10.0, 10.0, 0.0, -1.0, 1.0);
        // z = 0 lands in the middle of [0, 1].
        assert!((p.cols[3][2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn translation_moves_points() {
        let t = Mat4::translation_2d(Vec2::new(5.0, -3.0));
        assert_eq!(apply(&t, Vec2::new(1.0, 1.0)), Vec2::new(6.0, -2.0));
        assert_eq!(t.translation_part(), Vec2::new(5.0, -3.0));
    }

    #[test]
    fn mul_applies_right_hand_side_first() {
        let proj = Mat4::ortho(0.0, 100.0, 100.0, 0.0, -1.0, 1.0);
        let model = Mat4::translation(50.0, 50.0, 0.0);
        let mvp = proj.mul(&model);
        assert!(close(apply(&mvp, Vec2::ZERO), Vec2::ZERO));
    }

    #[test]
    fn identity_is_neutral() {
        let t = Mat4::translation(1.0, 2.0, 3.0);
        assert_eq!(Mat4::IDENTITY.mul(&t), t);
        assert_eq!(t.mul(&Mat4::IDENTITY), t);
    }
}
