use remote_paste_core::{CellPos, ChunkCoord};
use remote_paste_system_progress::{chunk_line, header_line, ProgressReporter};

#[test]
fn closest_chunks_are_listed_first() {
    let mut reporter = ProgressReporter::new(10);
    let chunks = [
        ChunkCoord::new(5, 5),
        ChunkCoord::new(0, 0),
        ChunkCoord::new(-2, 1),
        ChunkCoord::new(1, 0),
    ];

    let lines = reporter.rebuild(chunks, Some(CellPos::new(2, 64, 2)));

    assert_eq!(
        lines,
        &[
            header_line(4),
            chunk_line(&ChunkCoord::new(0, 0)),
            chunk_line(&ChunkCoord::new(1, 0)),
            chunk_line(&ChunkCoord::new(-2, 1)),
            chunk_line(&ChunkCoord::new(5, 5)),
        ],
        "chunks should be sorted by distance from the requester",
    );
}

#[test]
fn equal_distances_keep_supplied_order() {
    let mut reporter = ProgressReporter::new(10);
    let reference = CellPos::new(0, 0, 0);
    let chunks = [
        ChunkCoord::new(0, 1),
        ChunkCoord::new(1, 0),
        ChunkCoord::new(0, -1),
        ChunkCoord::new(-1, 0),
    ];

    let lines = reporter.rebuild(chunks, Some(reference)).to_vec();

    let expected: Vec<String> = std::iter::once(header_line(4))
        .chain(chunks.iter().map(chunk_line))
        .collect();
    assert_eq!(lines, expected, "sorting must be stable for ties");
}

#[test]
fn entries_are_truncated_but_header_counts_everything() {
    let mut reporter = ProgressReporter::new(2);
    let chunks = (0..6).map(|index| ChunkCoord::new(index, 0));

    let lines = reporter.rebuild(chunks, Some(CellPos::new(0, 0, 0)));

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], header_line(6));
    assert_eq!(lines[1], chunk_line(&ChunkCoord::new(0, 0)));
    assert_eq!(lines[2], chunk_line(&ChunkCoord::new(1, 0)));
}

#[test]
fn zero_line_limit_keeps_only_the_header() {
    let mut reporter = ProgressReporter::new(0);
    let lines = reporter.rebuild([ChunkCoord::new(3, 3)], Some(CellPos::new(0, 0, 0)));
    assert_eq!(lines, &[header_line(1)]);
}

#[test]
fn missing_reference_clears_lines() {
    let mut reporter = ProgressReporter::new(5);
    let _ = reporter.rebuild([ChunkCoord::new(1, 1)], Some(CellPos::new(0, 0, 0)));
    assert_eq!(reporter.lines().len(), 2);

    let lines = reporter.rebuild([ChunkCoord::new(1, 1)], None);
    assert!(lines.is_empty(), "no requester means nothing to render");
}

#[test]
fn listed_chunks_never_decrease_in_distance() {
    let mut reporter = ProgressReporter::new(64);
    let reference = CellPos::new(-37, 70, 91);
    let chunks: Vec<ChunkCoord> = (-4..4)
        .flat_map(|x| (-4..4).map(move |z| ChunkCoord::new(x * 3 % 7, z * 5 % 9)))
        .collect();

    let _ = reporter.rebuild(chunks.iter().copied(), Some(reference));

    let mut sorted = chunks.clone();
    sorted.sort_by_key(|chunk| chunk.distance_squared_to(reference));
    let distances: Vec<u128> = sorted
        .iter()
        .map(|chunk| chunk.distance_squared_to(reference))
        .collect();
    assert!(distances.windows(2).all(|pair| pair[0] <= pair[1]));

    let rendered: Vec<String> = sorted.iter().map(chunk_line).collect();
    assert_eq!(&reporter.lines()[1..], rendered.as_slice());
}

#[test]
fn chunks_at_coordinate_extremes_are_ordered_without_overflow() {
    let mut reporter = ProgressReporter::new(4);
    let far_corner = CellPos::new(i32::MIN, 0, i32::MIN).chunk();
    let near_corner = CellPos::new(i32::MAX, 0, i32::MAX).chunk();

    let lines = reporter.rebuild(
        [far_corner, ChunkCoord::new(0, 0), near_corner],
        Some(CellPos::new(i32::MAX, 0, i32::MAX)),
    );

    assert_eq!(
        lines,
        [
            header_line(3),
            chunk_line(&near_corner),
            chunk_line(&ChunkCoord::new(0, 0)),
            chunk_line(&far_corner),
        ]
    );
}
