//! Affine `transform` attribute values

/// A 2D affine transform `[a c e; b d f; 0 0 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Transform {
    /// The identity transform
    pub fn identity() -> Self {
        Self::matrix(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Pure translation
    pub fn translate(x: f64, y: f64) -> Self {
        Self::matrix(1.0, 0.0, 0.0, 1.0, x, y)
    }

    fn matrix(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Parse a transform list such as `translate(5,10) scale(2)`.
    ///
    /// Supports `matrix`, `translate`, `scale` and `rotate`; returns `None`
    /// on anything else.
    pub fn parse(value: &str) -> Option<Self> {
        let mut result = Self::identity();
        let mut rest = value.trim();
        while !rest.is_empty() {
            let open = rest.find('(')?;
            let close = rest.find(')')?;
            if close < open {
                return None;
            }
            let name = rest[..open].trim().trim_start_matches(',').trim();
            let args = crate::svg::document::parse_number_list(&rest[open + 1..close]);
            let step = match (name, args.as_slice()) {
                ("matrix", [a, b, c, d, e, f]) => Self::matrix(*a, *b, *c, *d, *e, *f),
                ("translate", [x]) => Self::translate(*x, 0.0),
                ("translate", [x, y]) => Self::translate(*x, *y),
                ("scale", [s]) => Self::matrix(*s, 0.0, 0.0, *s, 0.0, 0.0),
                ("scale", [sx, sy]) => Self::matrix(*sx, 0.0, 0.0, *sy, 0.0, 0.0),
                ("rotate", [deg]) => Self::rotation(*deg),
                ("rotate", [deg, cx, cy]) => Self::translate(-cx, -cy)
                    .then(&Self::rotation(*deg))
                    .then(&Self::translate(*cx, *cy)),
                _ => return None,
            };
            // transform lists apply right-to-left
            result = step.then(&result);
            rest = rest[close + 1..].trim_start();
        }
        Some(result)
    }

    fn rotation(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self::matrix(cos, sin, -sin, cos, 0.0, 0.0)
    }

    /// Compose: apply `self` first, then `next`
    pub fn then(&self, next: &Transform) -> Transform {
        Transform {
            a: next.a * self.a + next.c * self.b,
            b: next.b * self.a + next.d * self.b,
            c: next.a * self.c + next.c * self.d,
            d: next.b * self.c + next.d * self.d,
            e: next.a * self.e + next.c * self.f + next.e,
            f: next.b * self.e + next.d * self.f + next.f,
        }
    }

    /// Map a point
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }
}
