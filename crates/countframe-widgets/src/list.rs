//! The regions of a document, with persistence.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::Rc;

use countframe_geom::{
    format, ImageStack, MarginPolicy, RegionError, RegionGeometry, RegionKind, RegionSettings,
};
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, warn};

use crate::error::LoadError;
use crate::set::SharedRegion;

new_key_type! {
    /// Handle of a region within a [`RegionList`].
    pub struct RegionId;
}

/// One line that could not be restored.
#[derive(Debug)]
pub struct LoadFailure {
    /// 1-based line number.
    pub line: usize,
    /// The offending text.
    pub text: String,
    /// What went wrong.
    pub error: LoadError,
}

/// Outcome of [`RegionList::load`].
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Regions added, in file order.
    pub loaded: Vec<RegionId>,
    /// Lines that were skipped.
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    /// True if every line was restored.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Regions of one document, keyed by stable handles and listed in natural
/// order of their ids ("2" before "10").
#[derive(Debug, Default)]
pub struct RegionList {
    regions: SlotMap<RegionId, SharedRegion>,
}

impl RegionList {
    /// Empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// True if there are no regions.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Add an existing region.
    pub fn add(&mut self, region: RegionGeometry) -> RegionId {
        self.regions.insert(Rc::new(RefCell::new(region)))
    }

    /// Create a region on `policy` with the next free id and the default
    /// margins from `settings`.
    ///
    /// Default margins that do not fit the boundary are dropped.
    pub fn create(
        &mut self,
        policy: MarginPolicy,
        settings: &RegionSettings,
    ) -> Result<RegionId, RegionError> {
        self.insert_new(policy, settings.spacing, settings)
    }

    /// Create a region over `image` with the default policy kind from
    /// `settings`, using the image's own spacing.
    pub fn create_for_image(
        &mut self,
        image: &ImageStack,
        settings: &RegionSettings,
    ) -> Result<RegionId, RegionError> {
        let policy = MarginPolicy::for_image(image, settings.default_kind, settings.border_threshold)?;
        self.insert_new(policy, image.spacing(), settings)
    }

    fn insert_new(
        &mut self,
        policy: MarginPolicy,
        spacing: [f64; 3],
        settings: &RegionSettings,
    ) -> Result<RegionId, RegionError> {
        let mut region = RegionGeometry::new(self.next_id(), policy, spacing)?;
        if let Err(violation) = region.try_set_margins(settings.default_margins) {
            warn!(region = region.id(), %violation, "default margins do not fit, using zero");
        }
        debug!(region = region.id(), kind = %region.kind(), "region created");
        Ok(self.add(region))
    }

    /// Remove a region, returning its handle if it existed.
    pub fn remove(&mut self, id: RegionId) -> Option<SharedRegion> {
        self.regions.remove(id)
    }

    /// Shared handle to a region.
    pub fn get(&self, id: RegionId) -> Option<SharedRegion> {
        self.regions.get(id).cloned()
    }

    /// All regions, in natural order of their ids.
    pub fn ordered(&self) -> Vec<(RegionId, SharedRegion)> {
        let mut regions: Vec<_> = self
            .regions
            .iter()
            .map(|(key, region)| (key, Rc::clone(region)))
            .collect();
        regions.sort_by(|a, b| natural_cmp(a.1.borrow().id(), b.1.borrow().id()));
        regions
    }

    /// One more than the largest numeric id in use.
    pub fn next_id(&self) -> String {
        let max = self
            .regions
            .values()
            .filter_map(|r| r.borrow().id().parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        (max + 1).to_string()
    }

    /// One region line per region, in list order.
    pub fn save(&self) -> String {
        let mut out = String::new();
        for (_, region) in self.ordered() {
            out.push_str(&format::serialize(&region.borrow()));
            out.push('\n');
        }
        out
    }

    /// Restore regions from saved text.
    ///
    /// `build` makes a fresh region of the stored kind (the reference
    /// boundary is not part of the saved line); the stored margins are then
    /// applied to it. Blank lines and lines starting with `#` are skipped.
    /// A bad line is logged and reported but does not stop the load.
    pub fn load<F>(&mut self, text: &str, mut build: F) -> LoadReport
    where
        F: FnMut(RegionKind) -> Result<RegionGeometry, RegionError>,
    {
        let mut report = LoadReport::default();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match self.load_line(line, &mut build) {
                Ok(id) => report.loaded.push(id),
                Err(error) => {
                    warn!(line = index + 1, %error, "skipping region line");
                    report.failures.push(LoadFailure {
                        line: index + 1,
                        text: line.to_string(),
                        error,
                    });
                }
            }
        }
        debug!(
            loaded = report.loaded.len(),
            failed = report.failures.len(),
            "regions loaded"
        );
        report
    }

    fn load_line<F>(&mut self, line: &str, build: &mut F) -> Result<RegionId, LoadError>
    where
        F: FnMut(RegionKind) -> Result<RegionGeometry, RegionError>,
    {
        let parsed = format::parse(line)?;
        let mut region = build(parsed.kind)?;
        region.try_set_margins(parsed.margins)?;
        region.set_id(self.next_id());
        Ok(self.add(region))
    }
}

/// Compare ids so that digit runs order by value: "2" < "10" < "10a".
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a, b);
    loop {
        match (a.is_empty(), b.is_empty()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
        let (ta, ra) = split_run(a);
        let (tb, rb) = split_run(b);
        let digits = |t: &str| t.starts_with(|c: char| c.is_ascii_digit());
        let order = if digits(ta) && digits(tb) {
            let (na, nb) = (ta.trim_start_matches('0'), tb.trim_start_matches('0'));
            na.len().cmp(&nb.len()).then_with(|| na.cmp(nb))
        } else {
            ta.cmp(tb)
        };
        if order != Ordering::Equal {
            return order;
        }
        a = ra;
        b = rb;
    }
}

/// Split off the leading run of digits or of non-digits.
fn split_run(s: &str) -> (&str, &str) {
    let is_digit = s.starts_with(|c: char| c.is_ascii_digit());
    let end = s
        .find(|c: char| c.is_ascii_digit() != is_digit)
        .unwrap_or(s.len());
    s.split_at(end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use countframe_geom::{FormatError, MarginViolation, Margins};
    use countframe_math::Axis;

    fn build(kind: RegionKind) -> Result<RegionGeometry, RegionError> {
        match kind {
            RegionKind::Rectangular => {
                RegionGeometry::rectangular("", [0.0, 100.0, 0.0, 100.0, 0.0, 10.0], [1.0; 3])
            }
            RegionKind::Adaptive => Err(RegionError::MalformedBoundary("no outlines".into())),
        }
    }

    #[test]
    fn test_natural_order() {
        let mut ids = vec!["10", "2", "1", "b", "a10", "a9"];
        ids.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(ids, ["1", "2", "10", "a9", "a10", "b"]);
        assert_eq!(natural_cmp("007", "7"), Ordering::Equal);
    }

    #[test]
    fn test_create_assigns_ids() {
        let mut list = RegionList::new();
        let settings = RegionSettings {
            default_margins: Margins::new([5.0; 3], [5.0; 3]),
            ..RegionSettings::default()
        };
        let policy = MarginPolicy::rectangular([0.0, 100.0, 0.0, 100.0, 0.0, 100.0]);
        let first = list.create(policy.clone(), &settings).unwrap();
        let second = list.create(policy, &settings).unwrap();
        assert_eq!(list.get(first).unwrap().borrow().id(), "1");
        assert_eq!(list.get(second).unwrap().borrow().id(), "2");
        assert_eq!(list.get(first).unwrap().borrow().margins().inclusion, [5.0; 3]);

        // too thin for the default margins
        let thin = MarginPolicy::rectangular([0.0, 100.0, 0.0, 100.0, 0.0, 8.0]);
        let third = list.create(thin, &settings).unwrap();
        assert_eq!(list.get(third).unwrap().borrow().margins(), Margins::ZERO);
    }

    #[test]
    fn test_create_for_image_uses_default_kind() {
        let image = ImageStack::from_fn([10, 10, 4], [2.0, 2.0, 1.0], |x, y, _| {
            if (2..8).contains(&x) && (2..8).contains(&y) {
                100
            } else {
                0
            }
        })
        .unwrap();
        let mut settings = RegionSettings {
            default_margins: Margins::new([1.0, 0.0, 0.0], [0.0; 3]),
            ..RegionSettings::default()
        };
        let mut list = RegionList::new();

        let whole = list.create_for_image(&image, &settings).unwrap();
        let whole = list.get(whole).unwrap();
        assert_eq!(whole.borrow().kind(), RegionKind::Rectangular);
        assert_eq!(whole.borrow().policy().bounds().unwrap().range(Axis::X), (0.0, 20.0));

        settings.default_kind = RegionKind::Adaptive;
        let content = list.create_for_image(&image, &settings).unwrap();
        let content = list.get(content).unwrap();
        let region = content.borrow();
        assert_eq!(region.id(), "2");
        assert_eq!(region.kind(), RegionKind::Adaptive);
        assert_eq!(region.spacing(), [2.0, 2.0, 1.0]);
        assert_eq!(region.policy().bounds().unwrap().range(Axis::X), (4.0, 16.0));
        assert_eq!(region.margins().inclusion, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_save_and_load() {
        let mut list = RegionList::new();
        for _ in 0..11 {
            let id = list.next_id();
            let mut region = build(RegionKind::Rectangular).unwrap();
            region.set_id(id);
            list.add(region);
        }
        let ten = list.ordered()[9].0;
        list.get(ten)
            .unwrap()
            .borrow_mut()
            .try_set_margins(Margins::new([12.5, 0.0, 1.0], [3.0, 0.0, 0.0]))
            .unwrap();

        let text = list.save();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[9], "RectangularBoundingRegion=12.50,0.00,1.00,3.00,0.00,0.00");

        let mut restored = RegionList::new();
        let report = restored.load(&text, build);
        assert!(report.is_complete());
        assert_eq!(report.loaded.len(), 11);
        assert_eq!(restored.save(), text);
    }

    #[test]
    fn test_load_continues_past_bad_lines() {
        let text = "\
# regions
RectangularBoundingRegion=1,1,1,1,1,1
RectangularBoundingRegion=1,1,1
AdaptiveBoundingRegion=0,0,0,0,0,0

RectangularCountingFrame=2,2,2,2,2,2
RectangularBoundingRegion=90,0,0,20,0,0
";
        let mut list = RegionList::new();
        let report = list.load(text, build);
        assert_eq!(report.loaded.len(), 2);
        let lines: Vec<_> = report.failures.iter().map(|f| f.line).collect();
        assert_eq!(lines, [3, 4, 7]);
        assert!(matches!(
            report.failures[0].error,
            LoadError::Format(FormatError::FieldCount(3))
        ));
        assert!(matches!(report.failures[1].error, LoadError::Region(_)));
        assert!(matches!(
            report.failures[2].error,
            LoadError::Margins(MarginViolation::Crossing { .. })
        ));
        assert_eq!(list.get(report.loaded[1]).unwrap().borrow().margins().inclusion, [2.0; 3]);
    }
}
