/// Macro that sorts an arbitrary number of vecs by a the values
/// first one.
///
/// The first vec only needs `PartialOrd` elements, so float axes
/// (m/z, retention time) can be used as the key. Incomparable values
/// (NaN) keep their relative order.
///
/// NOTE: This macro creates a new ordered vec for each one.
///
/// # Example
/// ```
/// use gapfill::sort_vecs_by_first;
///
/// let va = vec![9.0, 8.0, 7.0];
/// let vb = vec![1, 2, 3];
/// let vc = vec!['a', 'b', 'c'];
/// let out = sort_vecs_by_first!(&va, &vb, &vc);
///
/// assert_eq!(out.0, vec![7.0, 8.0, 9.0]);
/// assert_eq!(out.1, vec![3, 2, 1]);
/// assert_eq!(out.2, vec!['c', 'b', 'a']);
/// ```
///
#[macro_export]
macro_rules! sort_vecs_by_first {
    ($first:expr $(,$rest:expr)*) => {{
        let first_vec = $first;
        let len = first_vec.len();

        // Create and sort indices
        let mut indices: Vec<usize> = (0..len).collect();
        indices.sort_by(|&a, &b| {
            first_vec[a]
                .partial_cmp(&first_vec[b])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        // Reorder first vector
        let sorted_first: Vec<_> = indices.iter().map(|&i| first_vec[i]).collect();

        // Reorder all other vectors
        (sorted_first, $( {
            let other_vec = $rest;
            assert_eq!(other_vec.len(), len, "All vectors must have the same length");
            indices.iter().map(|&i| other_vec[i]).collect::<Vec<_>>()
        }, )*)
    }};
}
