//! Parallel evaluation of independent sections

use rayon::prelude::*;

use crate::engine::SectionRequest;
use crate::error::SectionResult;
use crate::results::SectionAnalysis;

/// Evaluate every request in parallel
///
/// Results come back in request order; a failing request does not stop the
/// others.
pub fn compute_all(requests: &[SectionRequest]) -> Vec<SectionResult<SectionAnalysis>> {
    log::debug!("evaluating {} sections", requests.len());
    requests.par_iter().map(SectionRequest::evaluate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ElementType;
    use crate::elements::CrossSectionGeometry;
    use crate::engine::update_properties;

    #[test]
    fn test_order_and_isolation() {
        let requests = vec![
            SectionRequest::new(CrossSectionGeometry::rectangular(0.2, 0.1), 0.3, ElementType::Beam1),
            SectionRequest::new(CrossSectionGeometry::pipe(0.1, 0.5), 0.3, ElementType::Pipe1),
            SectionRequest::new(CrossSectionGeometry::rectangular(0.1, 0.1), 0.3, ElementType::Beam1),
        ];
        let results = compute_all(&requests);

        assert_eq!(results.len(), 3);
        assert!(results[1].is_err());

        let first = results[0].as_ref().unwrap();
        let serial = update_properties(
            &requests[0].geometry,
            0.3,
            ElementType::Beam1,
            &requests[0].options,
        )
        .unwrap();
        assert_eq!(first.properties, serial.properties);

        let third = results[2].as_ref().unwrap();
        assert!((third.properties.area - 0.01).abs() < 1e-14);
    }
}
