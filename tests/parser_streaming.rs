//! Property-style tests for the two invariants that matter most for a
//! streaming parser: the result must not depend on how the body was chunked,
//! nor on the ring buffer's starting capacity.

use bytes::Bytes;
use futures::stream;
use multipart_stream::{Multipart, ParserConfig};

async fn collect(body: &[u8], config: ParserConfig) -> Vec<(Option<String>, Vec<u8>)> {
    let chunks = stream::iter([Ok::<_, std::io::Error>(Bytes::copy_from_slice(body))]);
    let mut multipart = Multipart::with_config(Some("multipart/form-data; boundary=B"), chunks, config);
    collect_parts(&mut multipart).await
}

async fn collect_chunked(body: &[u8], chunk_sizes: &[usize], config: ParserConfig) -> Vec<(Option<String>, Vec<u8>)> {
    let mut pieces = Vec::new();
    let mut rest = body;
    for &size in chunk_sizes {
        let size = size.min(rest.len());
        let (piece, remainder) = rest.split_at(size);
        pieces.push(Ok::<_, std::io::Error>(Bytes::copy_from_slice(piece)));
        rest = remainder;
    }
    if !rest.is_empty() {
        pieces.push(Ok(Bytes::copy_from_slice(rest)));
    }
    let chunks = stream::iter(pieces);
    let mut multipart = Multipart::with_config(Some("multipart/form-data; boundary=B"), chunks, config);
    collect_parts(&mut multipart).await
}

async fn collect_parts<S>(multipart: &mut Multipart<S>) -> Vec<(Option<String>, Vec<u8>)>
where
    S: futures::Stream<Item = Result<Bytes, std::io::Error>> + Unpin,
{
    let mut out = Vec::new();
    while let Some(mut part) = multipart.next_part().await.unwrap() {
        let name = part.field_name().map(str::to_owned);
        let bytes = part.bytes().await.unwrap().to_vec();
        out.push((name, bytes));
    }
    out
}

fn sample_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(b"--B\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\n");
    body.extend_from_slice(b"hello world, this is field a");
    body.extend_from_slice(b"\r\n--B\r\nContent-Disposition: form-data; name=\"b\"; filename=\"f.bin\"\r\n\r\n");
    body.extend(std::iter::repeat(0xABu8).take(500));
    body.extend_from_slice(b"\r\n--B--\r\n");
    body
}

#[tokio::test]
async fn chunk_invariance_single_chunk_vs_per_byte_vs_random_sizes() {
    let body = sample_body();

    let whole = collect(&body, ParserConfig::default()).await;

    let per_byte_sizes = vec![1; body.len()];
    let per_byte = collect_chunked(&body, &per_byte_sizes, ParserConfig::default()).await;
    assert_eq!(whole, per_byte);

    // A small deterministic pseudo-random sequence of chunk sizes, derived
    // from a fixed linear congruential sequence so the test stays
    // reproducible without pulling in a `rand` dependency.
    let mut sizes = Vec::new();
    let mut state: u32 = 0x2545F491;
    while sizes.iter().sum::<usize>() < body.len() {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        sizes.push(1 + (state as usize % 37));
    }
    let random_chunks = collect_chunked(&body, &sizes, ParserConfig::default()).await;
    assert_eq!(whole, random_chunks);
}

#[tokio::test]
async fn buffer_growth_invariance_across_initial_capacities() {
    let body = sample_body();
    let baseline = collect(&body, ParserConfig::default()).await;

    for initial in [1usize, 2, 8, 64, 1024, 16 * 1024] {
        let config = ParserConfig::default().initial_buffer_size(initial);
        let result = collect(&body, config).await;
        assert_eq!(result, baseline, "mismatch at initial_buffer_size={initial}");
    }
}
