use qoi::{
    consts::*,
    decode::{DecodeError, SliceDecodeOutput},
    utils::hash,
    ColorCache, Pixel, QoiDecodeContext, QoiEncodeContext,
};

fn encode(pixels: &[Pixel]) -> Vec<u8> {
    let mut v = Vec::new();
    QoiEncodeContext::encode_chunks_to_vec(pixels, &mut v);
    v
}

fn decode(data: &[u8], pixel_count: usize) -> Result<(Vec<Pixel>, ColorCache), DecodeError> {
    let mut pixels = vec![Pixel::default(); pixel_count];
    let mut ctx = QoiDecodeContext::new();
    let consumed =
        ctx.decode_chunks(data, pixel_count, &mut SliceDecodeOutput::<Pixel>::new(&mut pixels))?;
    assert_eq!(consumed, data.len());
    Ok((pixels, ctx.cache))
}

/// Splits a chunk stream into its chunks.
fn split_chunks(mut data: &[u8]) -> Vec<&[u8]> {
    let mut chunks = Vec::new();
    while let Some(&tag) = data.first() {
        let len = match tag {
            QOI_OP_RGB => 4,
            QOI_OP_RGBA => 5,
            _ if tag & QOI_MASK_2 == QOI_OP_LUMA => 2,
            _ => 1,
        };
        let (chunk, rest) = data.split_at(len);
        chunks.push(chunk);
        data = rest;
    }
    chunks
}

#[test]
fn single_default_pixel() {
    let encoded = encode(&[Pixel::rgb(0, 0, 0)]);
    assert_eq!(encoded, [0xFE, 0, 0, 0]);

    let (decoded, _) = decode(&[0xFE, 0, 0, 0], 1).unwrap();
    assert_eq!(decoded, [Pixel::new(0, 0, 0, 255)]);
}

#[test]
fn long_run_is_split() {
    let pixel = Pixel::rgb(10, 20, 30);
    let mut input = vec![pixel];
    input.extend([pixel; 70]);

    let encoded = encode(&input);
    assert_eq!(
        encoded,
        [QOI_OP_RGB, 10, 20, 30, QOI_OP_RUN | (62 - 1), QOI_OP_RUN | (8 - 1)]
    );
    assert_eq!(decode(&encoded, input.len()).unwrap().0, input);
}

#[test]
fn run_chunk_count() {
    for n in [1, 61, 62, 63, 124, 125, 1000] {
        let mut input = vec![Pixel::rgb(5, 5, 5)];
        input.extend(vec![Pixel::rgb(5, 5, 5); n]);

        let encoded = encode(&input);
        let runs: Vec<_> = split_chunks(&encoded[4..]).into_iter().collect();
        assert_eq!(runs.len(), (n + QOI_MAX_RUN - 1) / QOI_MAX_RUN, "run of {n}");
        assert!(runs
            .iter()
            .all(|c| c[0] & QOI_MASK_2 == QOI_OP_RUN && usize::from(c[0] & 0x3F) < QOI_MAX_RUN));
        assert_eq!(decode(&encoded, input.len()).unwrap().0, input);
    }
}

#[test]
fn small_difference_is_one_byte() {
    let input = [Pixel::rgb(100, 50, 25), Pixel::rgb(101, 50, 25)];
    let encoded = encode(&input);
    assert_eq!(encoded[4..], [QOI_OP_DIFF | 3 << 4 | 2 << 2 | 2]);
    assert_eq!(decode(&encoded, 2).unwrap().0, input);

    let wrapping = [Pixel::rgb(255, 0, 1), Pixel::rgb(0, 255, 0)];
    let encoded = encode(&wrapping);
    assert_eq!(encoded[4..], [QOI_OP_DIFF | 3 << 4 | 1 << 2 | 1]);
    assert_eq!(decode(&encoded, 2).unwrap().0, wrapping);
}

#[test]
fn larger_difference_is_luma() {
    let input = [Pixel::rgb(100, 100, 100), Pixel::rgb(120, 120, 118)];
    let encoded = encode(&input);
    assert_eq!(encoded[4..], [QOI_OP_LUMA | (20 + 32), 0x86]);
    assert_eq!(decode(&encoded, 2).unwrap().0, input);

    // Outside of the 6-bit green range only the literal remains.
    let input = [Pixel::rgb(100, 100, 100), Pixel::rgb(140, 140, 140)];
    let encoded = encode(&input);
    assert_eq!(encoded[4..], [QOI_OP_RGB, 140, 140, 140]);
}

#[test]
fn index_wins_over_diff() {
    let a = Pixel::rgb(100, 100, 100);
    let b = Pixel::rgb(101, 100, 100);
    let input = [a, b, a];

    let encoded = encode(&input);
    let chunks = split_chunks(&encoded);
    assert_eq!(chunks.len(), 3);
    // `a` is a small diff away from `b`, but it is also in the color array.
    assert_eq!(chunks[2], [QOI_OP_INDEX | hash(a)]);
    assert_eq!(decode(&encoded, 3).unwrap().0, input);
}

#[test]
fn alpha_change_forces_rgba() {
    let input = [
        Pixel::rgb(100, 100, 100),
        Pixel::new(100, 100, 100, 254),
        Pixel::new(101, 100, 100, 254),
        Pixel::new(130, 120, 110, 1),
        Pixel::new(131, 120, 110, 1),
    ];

    let encoded = encode(&input);
    let chunks = split_chunks(&encoded);
    assert_eq!(chunks.len(), 5);
    assert_eq!(chunks[1], [QOI_OP_RGBA, 100, 100, 100, 254]);
    assert_eq!(chunks[2][0] & QOI_MASK_2, QOI_OP_DIFF);
    assert_eq!(chunks[3], [QOI_OP_RGBA, 130, 120, 110, 1]);
    assert_eq!(chunks[4][0] & QOI_MASK_2, QOI_OP_DIFF);
    assert_eq!(decode(&encoded, input.len()).unwrap().0, input);
}

#[test]
fn color_array_keeps_first_pixel_per_slot() {
    let first = Pixel::new(1, 0, 0, 0);
    let collision = Pixel::new(0, 0, 0, 41);
    assert_eq!(hash(first), hash(collision));

    let input = [first, collision, first, collision];
    let encoded = encode(&input);
    let chunks = split_chunks(&encoded);

    assert_eq!(chunks[2], [QOI_OP_INDEX | hash(first)]);
    // The slot still holds `first`, so `collision` has to be spelled out again.
    assert_eq!(chunks[3], [QOI_OP_RGBA, 0, 0, 0, 41]);
    assert_eq!(decode(&encoded, 4).unwrap().0, input);
}

#[test]
fn color_arrays_stay_in_sync() {
    let mut state = 1u32;
    let mut rand = move || {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
        (state >> 16) as u8 % 4
    };
    let input: Vec<Pixel> = (0..400)
        .map(|_| Pixel::new(rand() * 60, rand(), rand() * 70, 255 - rand() / 3))
        .collect();

    for n in 0..=input.len() {
        let prefix = &input[..n];

        let mut encoder = QoiEncodeContext::new();
        let mut encoded = Vec::new();
        let mut push = |bytes: &[u8]| {
            encoded.extend_from_slice(bytes);
            Ok::<_, std::convert::Infallible>(())
        };
        encoder.push_pixels_with(prefix, &mut push).unwrap();
        encoder.finish_with(&mut push).unwrap();

        let (decoded, decoder_cache) = decode(&encoded, n).unwrap();
        assert_eq!(decoded, prefix);
        assert_eq!(encoder.cache, decoder_cache, "after {n} pixels");
    }
}

#[test]
fn index_to_empty_slot_is_an_error() {
    assert!(matches!(
        decode(&[QOI_OP_RGB, 1, 2, 3, QOI_OP_INDEX | 7], 2),
        Err(DecodeError::UnresolvedIndex { index: 7 })
    ));
}
