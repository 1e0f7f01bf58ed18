#![cfg(feature = "rayon")]

use kickercheck::{
    Image, LabelTable, MemorySource, Pipeline, PipelineConfig, Template, TemplateSet,
};

fn make_frame(width: usize, height: usize, seed: usize) -> Image {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let value = ((x * 13) ^ (y * 7) ^ (x * y) ^ (seed * 31)) & 0xFF;
            data.push(value as u8);
        }
    }
    Image::from_u8(&data, width, height, 255).unwrap()
}

#[test]
fn parallel_batch_matches_sequential_classify() {
    let templates = TemplateSet::new(
        (0..4)
            .map(|i| Template::new(format!("t{i}"), make_frame(128, 128, 100 + i)))
            .collect(),
    )
    .unwrap();
    let pipeline = Pipeline::new(
        PipelineConfig::embedded(),
        templates,
        LabelTable::with_valid(4, &[1, 2]).unwrap(),
    )
    .unwrap();

    let ids: Vec<String> = (1..=16).map(|i| format!("{i}.pgm")).collect();
    let source: MemorySource = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.clone(), make_frame(160 + i, 120, i)))
        .collect();

    let items = pipeline.classify_batch(&source, &ids).unwrap();
    assert_eq!(items.len(), ids.len());
    for (item, id) in items.iter().zip(&ids) {
        assert_eq!(&item.id, id);
        let sequential = pipeline
            .classify(&kickercheck::ImageSource::get(&source, id).unwrap())
            .unwrap();
        assert_eq!(item.outcome.as_ref().unwrap(), &sequential);
    }
}
